//! LegalTracker API connector.
//!
//! Maps the hosted invoice API into normalized [`SpendRecord`]s. Every call
//! first passes the shared [`RateLimiter`], keyed by the configured API
//! credential so distinct credentials never share a budget. Transport and
//! payload failures are logged and degrade to empty results; only
//! construction-time configuration problems surface as errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use legalspend_core::{
    vendor_id, RateLimiter, SourceConfig, SourceKind, SpendError, SpendFilters, SpendRecord,
    SpendSource, VendorRef, VendorType,
};

mod wire;

/// Provenance tag stamped on every record this connector produces.
const SOURCE_SYSTEM: &str = "LegalTracker";

/// Default timeout for invoice and vendor requests, seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shorter timeout for the lightweight health probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Connector for the LegalTracker invoice API.
#[derive(Debug)]
pub struct TrackerSource {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl TrackerSource {
    /// Build a connector from configuration. Requires `api_key` and
    /// `base_url` connection parameters; `timeout` (seconds) defaults to 30.
    ///
    /// # Errors
    /// Returns a configuration error when a required parameter is missing or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &SourceConfig, limiter: Arc<RateLimiter>) -> Result<Self, SpendError> {
        let params = &config.connection_params;
        let api_key = params
            .str("api_key")
            .ok_or_else(|| SpendError::config(format!("{}: missing api_key", config.name)))?
            .to_string();
        let base_url = params
            .str("base_url")
            .ok_or_else(|| SpendError::config(format!("{}: missing base_url", config.name)))?
            .trim_end_matches('/')
            .to_string();
        let timeout = Duration::from_secs(params.u64("timeout").unwrap_or(DEFAULT_TIMEOUT_SECS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpendError::config(format!("{}: http client: {e}", config.name)))?;

        Ok(Self {
            name: config.name.clone(),
            base_url,
            api_key,
            client,
            limiter,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_invoices(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        self.limiter.acquire(&self.api_key).await;

        let mut query: Vec<(&str, String)> = vec![
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("status", "approved".to_string()),
        ];
        if let Some(filters) = filters {
            if let Some(vendor) = &filters.vendor {
                query.push(("vendor", vendor.clone()));
            }
            if let Some(department) = &filters.department {
                query.push(("department", department.clone()));
            }
            if let Some(practice_area) = &filters.practice_area {
                query.push(("practice_area", practice_area.clone()));
            }
        }

        let response = self
            .client
            .get(self.endpoint("/api/v1/invoices"))
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?
            .error_for_status()
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?;

        let page: wire::InvoicePage = response
            .json()
            .await
            .map_err(|e| SpendError::data(format!("{}: invoice payload: {e}", self.name)))?;

        // Decode entries one by one so a malformed invoice is skipped, not
        // fatal to the batch.
        let mut records = Vec::with_capacity(page.invoices.len());
        for raw in page.invoices {
            match serde_json::from_value::<wire::WireInvoice>(raw) {
                Ok(invoice) => records.push(invoice.into_record(SOURCE_SYSTEM)),
                Err(e) => warn!(source = %self.name, error = %e, "skipping malformed invoice"),
            }
        }

        // Amount bounds are not an upstream query parameter; enforce locally.
        if let Some(filters) = filters {
            records.retain(|r| {
                filters.min_amount.is_none_or(|min| r.amount >= min)
                    && filters.max_amount.is_none_or(|max| r.amount <= max)
            });
        }

        debug!(source = %self.name, count = records.len(), "fetched invoices");
        Ok(records)
    }

    async fn fetch_vendors(&self) -> Result<Vec<VendorRef>, SpendError> {
        self.limiter.acquire(&self.api_key).await;

        let response = self
            .client
            .get(self.endpoint("/api/v1/vendors"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?
            .error_for_status()
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?;

        let page: wire::VendorPage = response
            .json()
            .await
            .map_err(|e| SpendError::data(format!("{}: vendor payload: {e}", self.name)))?;

        let mut vendors = Vec::with_capacity(page.vendors.len());
        for raw in page.vendors {
            match serde_json::from_value::<wire::WireVendor>(raw) {
                Ok(vendor) => {
                    let kind = vendor
                        .kind
                        .as_deref()
                        .map_or(VendorType::LawFirm, VendorType::parse_lenient);
                    vendors.push(VendorRef {
                        id: vendor_id(&vendor.name),
                        name: vendor.name,
                        kind,
                        source: SOURCE_SYSTEM.to_string(),
                    });
                }
                Err(e) => warn!(source = %self.name, error = %e, "skipping malformed vendor"),
            }
        }
        Ok(vendors)
    }
}

#[async_trait]
impl SpendSource for TrackerSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Api
    }

    async fn spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        match self.fetch_invoices(start, end, filters).await {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(source = %self.name, error = %e, "invoice fetch failed; returning empty");
                Ok(vec![])
            }
        }
    }

    async fn vendors(&self) -> Result<Vec<VendorRef>, SpendError> {
        match self.fetch_vendors().await {
            Ok(vendors) => Ok(vendors),
            Err(e) => {
                warn!(source = %self.name, error = %e, "vendor fetch failed; returning empty");
                Ok(vec![])
            }
        }
    }

    async fn test_connection(&self) -> bool {
        self.limiter.acquire(&self.api_key).await;
        let result = self
            .client
            .get(self.endpoint("/api/v1/health"))
            .bearer_auth(&self.api_key)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;
        matches!(result, Ok(response) if response.status().is_success())
    }
}
