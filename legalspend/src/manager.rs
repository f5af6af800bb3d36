use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use legalspend_core::{
    analytics, ConnectionStatus, RateLimiter, SourceConfig, SourceRegistry, SourceStatus,
    SpendCache, SpendError, SpendFilters, SpendRecord, SpendSource, SpendSummary, SpendTrend,
    VendorRef,
};
use legalspend_types::{SpendCategories, SpendOverview, VendorBenchmarks};

use crate::registry::default_registry;

/// How long aggregated spend queries stay cached. A deliberate
/// staleness/performance trade-off: invoice data moves slowly, so a few
/// minutes of staleness buys a large reduction in source fan-outs.
/// Overridable via [`SpendManagerBuilder::cache_ttl`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default budget variance tolerance band, percent.
pub const DEFAULT_BUDGET_TOLERANCE_PCT: f64 = 10.0;

/// Default courtesy budget for remote API sources: requests per window.
const DEFAULT_RATE_LIMIT: usize = 60;
const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Trailing window used when deriving categorization metadata.
const CATEGORY_LOOKBACK_DAYS: u64 = 365;

/// Builder for a [`SpendManager`].
pub struct SpendManagerBuilder {
    registry: Option<SourceRegistry>,
    limiter: Option<Arc<RateLimiter>>,
    cache_ttl: Duration,
    budget_tolerance_pct: f64,
}

impl Default for SpendManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpendManagerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            limiter: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            budget_tolerance_pct: DEFAULT_BUDGET_TOLERANCE_PCT,
        }
    }

    /// Use a custom adapter registry instead of the built-in one.
    #[must_use]
    pub fn with_registry(mut self, registry: SourceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Share an existing rate limiter with the built-in registry's API
    /// factories. Ignored when a custom registry is supplied.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Cache lifetime for aggregated spend queries.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Variance band (percent) treated as "within budget" by the
    /// recommendation helper.
    #[must_use]
    pub const fn budget_tolerance_pct(mut self, pct: f64) -> Self {
        self.budget_tolerance_pct = pct;
        self
    }

    /// Build the manager.
    ///
    /// # Errors
    /// Returns a configuration error if the built-in registry cannot be
    /// assembled.
    pub fn build(self) -> Result<SpendManager, SpendError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let limiter = self.limiter.unwrap_or_else(|| {
                    Arc::new(RateLimiter::new(DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW))
                });
                default_registry(limiter)?
            }
        };
        Ok(SpendManager {
            sources: Vec::new(),
            registry,
            cache: SpendCache::new(self.cache_ttl),
            budget_tolerance_pct: self.budget_tolerance_pct,
        })
    }
}

/// Orchestrates a collection of active spend sources: parallel fan-out
/// queries, caching, cross-source merge/dedup, and the derived analytics.
///
/// The manager retains only sources that passed a connectivity probe during
/// [`initialize_sources`](Self::initialize_sources). Aggregate operations
/// isolate per-source failures: one broken source is logged and skipped,
/// never allowed to suppress the other sources' results.
pub struct SpendManager {
    sources: Vec<Arc<dyn SpendSource>>,
    registry: SourceRegistry,
    cache: SpendCache<Vec<SpendRecord>>,
    budget_tolerance_pct: f64,
}

impl SpendManager {
    /// Start building a manager.
    #[must_use]
    pub fn builder() -> SpendManagerBuilder {
        SpendManagerBuilder::new()
    }

    /// Construct, probe and retain adapters for every enabled configuration.
    ///
    /// Behavior and trade-offs:
    /// - Disabled configurations are skipped silently.
    /// - A failing constructor or probe is logged and skipped; one bad
    ///   source never aborts initialization of the rest.
    /// - Only probe-passing sources are retained, so later fan-outs hit
    ///   live sources only.
    pub async fn initialize_sources(&mut self, configs: &[SourceConfig]) {
        for config in configs {
            if !config.enabled {
                debug!(source = %config.name, "source disabled; skipping");
                continue;
            }
            let source = match self.registry.build(config) {
                Ok(source) => source,
                Err(e) => {
                    error!(source = %config.name, error = %e, "failed to construct source");
                    continue;
                }
            };
            if source.test_connection().await {
                info!(source = %config.name, kind = %config.kind, "initialized data source");
                self.sources.push(source);
            } else {
                warn!(source = %config.name, "connectivity probe failed; source not retained");
            }
        }
    }

    /// Register an already-constructed source, bypassing the registry and
    /// probe. Intended for embedders and tests.
    pub fn add_source(&mut self, source: Arc<dyn SpendSource>) {
        self.sources.push(source);
    }

    /// Names of the retained sources.
    #[must_use]
    pub fn active_sources(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Fetch spend records from one named source or from every active
    /// source.
    ///
    /// Behavior and trade-offs:
    /// - With `source_name`, only that source is queried; an unknown name
    ///   yields an empty result.
    /// - Otherwise all sources are queried concurrently and their records
    ///   concatenated. Order across sources is not guaranteed; order within
    ///   a source follows that adapter's own ordering.
    /// - Each source's failure is isolated and logged; the union of the
    ///   healthy sources' records is still returned.
    /// - Results are cached under a key derived from all arguments, for the
    ///   configured TTL.
    pub async fn get_spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
        source_name: Option<&str>,
    ) -> Vec<SpendRecord> {
        let key = format!(
            "spend_data:{start}:{end}:{}:{}",
            source_name.unwrap_or("*"),
            filters.map_or_else(|| "-".to_string(), SpendFilters::cache_token),
        );
        self.cache
            .get_or_insert_with(&key, None, || async move {
                Ok(self.fetch_spend_data(start, end, filters, source_name).await)
            })
            .await
            .unwrap_or_default()
    }

    async fn fetch_spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
        source_name: Option<&str>,
    ) -> Vec<SpendRecord> {
        if let Some(name) = source_name {
            let Some(source) = self.sources.iter().find(|s| s.name() == name) else {
                warn!(source = %name, "unknown source requested");
                return vec![];
            };
            return match source.spend_data(start, end, filters).await {
                Ok(records) => records,
                Err(e) => {
                    error!(source = %name, error = %e, "spend data fetch failed");
                    vec![]
                }
            };
        }

        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let name = source.name().to_string();
                (name, source.spend_data(start, end, filters).await)
            }
        });

        let mut all_records = Vec::new();
        for (name, result) in join_all(tasks).await {
            match result {
                Ok(records) => all_records.extend(records),
                Err(e) => error!(source = %name, error = %e, "spend data fetch failed"),
            }
        }
        all_records
    }

    /// Drop cached aggregates, optionally only those whose key contains
    /// `pattern`. Useful after a known upstream data correction.
    pub async fn invalidate_cache(&self, pattern: Option<&str>) {
        self.cache.invalidate(pattern).await;
    }

    /// Summarize a record set over a date range. Pure function of the given
    /// records: an empty set produces a zero summary with the range
    /// preserved.
    #[must_use]
    pub fn generate_summary(
        &self,
        records: &[SpendRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> SpendSummary {
        analytics::summarize(records, start, end)
    }

    /// Classify month-over-month movement for a record set.
    #[must_use]
    pub fn calculate_spend_trend(&self, records: &[SpendRecord]) -> SpendTrend {
        analytics::spend_trend(records)
    }

    /// Search transactions across every active source by case-insensitive
    /// substring over vendor, matter and description, with amount bounds and
    /// a result cap. Zero matches yield an empty vector.
    pub async fn search_transactions(
        &self,
        search_term: &str,
        start: NaiveDate,
        end: NaiveDate,
        min_amount: Option<Decimal>,
        max_amount: Option<Decimal>,
        limit: usize,
    ) -> Vec<SpendRecord> {
        let records = self.get_spend_data(start, end, None, None).await;
        analytics::search_records(records, search_term, min_amount, max_amount, limit)
    }

    /// All vendors across active sources, deduplicated by id and sorted by
    /// name.
    ///
    /// Behavior and trade-offs:
    /// - Sources are queried concurrently with per-source failure isolation.
    /// - Ids are stable content hashes of the vendor name, so the same
    ///   vendor reported by two sources collides on id; the first-seen entry
    ///   wins and later sources do not overwrite it.
    pub async fn get_all_vendors(&self) -> Vec<VendorRef> {
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let name = source.name().to_string();
                (name, source.vendors().await)
            }
        });

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (name, result) in join_all(tasks).await {
            match result {
                Ok(vendors) => {
                    for vendor in vendors {
                        if seen.insert(vendor.id.clone()) {
                            merged.push(vendor);
                        }
                    }
                }
                Err(e) => error!(source = %name, error = %e, "vendor fetch failed"),
            }
        }
        merged.sort_by(|a, b| a.name.cmp(&b.name));
        merged
    }

    /// Live connectivity report for every retained source. Probes are
    /// issued fresh on each call, never cached.
    pub async fn get_sources_status(&self) -> Vec<SourceStatus> {
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let status = if source.test_connection().await {
                    ConnectionStatus::Active
                } else {
                    ConnectionStatus::Disconnected
                };
                SourceStatus {
                    name: source.name().to_string(),
                    kind: source.kind(),
                    status,
                    // Disabled configurations are never retained.
                    enabled: true,
                }
            }
        });
        join_all(tasks).await
    }

    /// Records for one vendor (case-insensitive substring match) in a
    /// period.
    pub async fn get_vendor_data(
        &self,
        vendor_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<SpendRecord> {
        let filters = SpendFilters::default().vendor(vendor_name);
        self.get_spend_data(start, end, Some(&filters), None).await
    }

    /// Records for one department in a period.
    pub async fn get_department_spend(
        &self,
        department: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<SpendRecord> {
        let filters = SpendFilters::default().department(department);
        self.get_spend_data(start, end, Some(&filters), None).await
    }

    /// Calendar-month totals for a record set.
    #[must_use]
    pub fn get_monthly_breakdown(&self, records: &[SpendRecord]) -> BTreeMap<String, Decimal> {
        analytics::monthly_totals(records)
    }

    /// Budget variance in percent; zero when the budget is zero.
    #[must_use]
    pub fn budget_variance(&self, actual: Decimal, budget: Decimal) -> f64 {
        analytics::budget_variance(actual, budget)
    }

    /// Recommendation text for a variance, using the configured tolerance
    /// band plus a vendor-concentration check.
    #[must_use]
    pub fn generate_budget_recommendations(
        &self,
        variance_pct: f64,
        records: &[SpendRecord],
    ) -> Vec<String> {
        analytics::budget_recommendations(variance_pct, records, self.budget_tolerance_pct)
    }

    /// Industry benchmarks for a vendor. No comparables feed is wired up,
    /// so the payload reports itself unavailable.
    #[must_use]
    pub fn get_vendor_benchmarks(&self, vendor_name: &str) -> VendorBenchmarks {
        VendorBenchmarks::unavailable(vendor_name)
    }

    /// Distinct categorization values observed over the trailing year,
    /// with a coarse completeness score.
    pub async fn get_spend_categories(&self) -> SpendCategories {
        let end = Utc::now().date_naive();
        let start = end
            .checked_sub_days(Days::new(CATEGORY_LOOKBACK_DAYS))
            .unwrap_or(end);
        let records = self.get_spend_data(start, end, None, None).await;

        let mut expense_categories = BTreeSet::new();
        let mut practice_areas = BTreeSet::new();
        let mut departments = BTreeSet::new();
        let mut matter_types = BTreeSet::new();
        let mut complete = 0usize;
        for record in &records {
            expense_categories.insert(record.expense_category.clone());
            practice_areas.insert(record.practice_area.as_str().to_string());
            departments.insert(record.department.clone());
            if let Some(matter) = &record.matter_name {
                matter_types.insert(matter.clone());
            }
            if record.matter_name.is_some() && record.budget_code.is_some() {
                complete += 1;
            }
        }

        let completeness_score = if records.is_empty() {
            0.0
        } else {
            complete as f64 / records.len() as f64
        };

        SpendCategories {
            expense_categories: expense_categories.into_iter().collect(),
            practice_areas: practice_areas.into_iter().collect(),
            departments: departments.into_iter().collect(),
            matter_types: matter_types.into_iter().collect(),
            completeness_score,
        }
    }

    /// Overview of activity in a period: totals, vendor count, top
    /// categories, concentration alerts, and the month-over-month trend.
    pub async fn get_spend_overview(&self, start: NaiveDate, end: NaiveDate) -> SpendOverview {
        let records = self.get_spend_data(start, end, None, None).await;

        let total_spend: Decimal = records.iter().map(|r| r.amount).sum();
        let active_vendors = records
            .iter()
            .map(|r| r.vendor_name.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut alerts = Vec::new();
        if let Some((vendor, share)) = analytics::vendor_concentration(&records) {
            if share > analytics::CONCENTRATION_ALERT_PCT {
                alerts.push(format!(
                    "{vendor} accounts for {share:.1}% of spend in this period"
                ));
            }
        }

        SpendOverview {
            period_start: start,
            period_end: end,
            total_spend,
            transaction_count: records.len(),
            active_vendors,
            top_categories: analytics::category_totals(&records),
            alerts,
            trend: analytics::spend_trend(&records),
        }
    }

    /// Release every source's pooled resources. Safe to call even when some
    /// sources were never fully initialized.
    pub async fn cleanup(&self) {
        for source in &self.sources {
            source.close().await;
        }
        info!(count = self.sources.len(), "released data sources");
    }
}
