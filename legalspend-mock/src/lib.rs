//! In-memory spend source with deterministic data for tests and examples.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use legalspend_core::{
    analytics, PracticeArea, SourceKind, SpendError, SpendFilters, SpendRecord, SpendSource,
    VendorRef, VendorType,
};

/// Configurable mock source. Behavior (records served, probe outcome, forced
/// failures, artificial latency) is tailored per test via the builder-style
/// setters.
pub struct MockSource {
    name: String,
    kind: SourceKind,
    records: Vec<SpendRecord>,
    vendors: Vec<VendorRef>,
    connected: bool,
    fail_spend_data: bool,
    delay_ms: u64,
    spend_calls: AtomicUsize,
}

impl MockSource {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Api,
            records: Vec::new(),
            vendors: Vec::new(),
            connected: true,
            fail_spend_data: false,
            delay_ms: 0,
            spend_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Serve these records (date-range and filter narrowing still apply).
    #[must_use]
    pub fn with_records(mut self, records: Vec<SpendRecord>) -> Self {
        for record in &records {
            let vendor = VendorRef::new(
                record.vendor_name.clone(),
                record.vendor_type,
                self.name.clone(),
            );
            if !self.vendors.iter().any(|v| v.id == vendor.id) {
                self.vendors.push(vendor);
            }
        }
        self.records = records;
        self
    }

    /// Report this probe outcome from `test_connection`.
    #[must_use]
    pub const fn connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Make `spend_data` fail with a source error.
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail_spend_data = true;
        self
    }

    /// Sleep this long before answering, to exercise concurrency paths.
    #[must_use]
    pub const fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Number of `spend_data` calls served so far.
    #[must_use]
    pub fn spend_calls(&self) -> usize {
        self.spend_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpendSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        self.spend_calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_spend_data {
            return Err(SpendError::source(self.name.clone(), "forced failure"));
        }

        Ok(self
            .records
            .iter()
            .filter(|r| r.invoice_date >= start && r.invoice_date <= end)
            .filter(|r| filters.is_none_or(|f| analytics::matches_filters(r, f)))
            .cloned()
            .collect())
    }

    async fn vendors(&self) -> Result<Vec<VendorRef>, SpendError> {
        if self.fail_spend_data {
            return Err(SpendError::source(self.name.clone(), "forced failure"));
        }
        Ok(self.vendors.clone())
    }

    async fn test_connection(&self) -> bool {
        self.connected
    }
}

/// Convenience record constructor used across the workspace's tests.
#[must_use]
pub fn sample_record(vendor: &str, date: &str, amount: &str) -> SpendRecord {
    SpendRecord {
        invoice_id: format!("INV-{vendor}-{date}"),
        vendor_name: vendor.to_string(),
        vendor_type: VendorType::LawFirm,
        matter_id: None,
        matter_name: None,
        department: "Legal".to_string(),
        practice_area: PracticeArea::General,
        invoice_date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .expect("sample dates are YYYY-MM-DD"),
        amount: Decimal::from_str(amount).expect("sample amounts are decimal literals"),
        currency: "USD".to_string(),
        expense_category: "Legal Services".to_string(),
        description: String::new(),
        billing_period_start: None,
        billing_period_end: None,
        status: "approved".to_string(),
        budget_code: None,
        source_system: Some("mock".to_string()),
        metadata: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn serves_records_within_range() {
        let source = MockSource::new("mock").with_records(vec![
            sample_record("Vendor A", "2024-01-05", "100.00"),
            sample_record("Vendor B", "2024-06-05", "200.00"),
        ]);

        let records = source
            .spend_data(d("2024-01-01"), d("2024-03-31"), None)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(source.spend_calls(), 1);
    }

    #[tokio::test]
    async fn forced_failure_surfaces_as_source_error() {
        let source = MockSource::new("mock").failing();
        let err = source
            .spend_data(d("2024-01-01"), d("2024-12-31"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SpendError::Source { .. }));
    }
}
