//! The uniform contract every data source adapter implements.

use async_trait::async_trait;
use chrono::NaiveDate;
use legalspend_types::{SourceKind, SpendFilters, SpendRecord, VendorRef};

use crate::SpendError;

/// A source of normalized legal-spend records.
///
/// Implementations cover one category of upstream system (a vendor REST API,
/// a relational database, a flat file) and translate its raw shape into
/// [`SpendRecord`]s. Adapters are expected to degrade gracefully: transient
/// I/O, parsing, and upstream failures are logged and surface as an empty
/// record set rather than an error, and a single bad row never aborts the
/// rest of a batch. The `Result` return exists so the manager can still
/// isolate anything that escapes.
#[async_trait]
pub trait SpendSource: Send + Sync {
    /// Configured name of this source, used in logs and status reports.
    fn name(&self) -> &str;

    /// Broad source category.
    fn kind(&self) -> SourceKind;

    /// Fetch records whose invoice date falls within `start..=end`
    /// (inclusive), optionally narrowed by `filters`. `start <= end` is the
    /// caller's responsibility.
    async fn spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError>;

    /// List the vendors known to this source. Ids must be a stable,
    /// deterministic function of the vendor name (see
    /// [`legalspend_types::vendor_id`]) so downstream dedup by id works.
    async fn vendors(&self) -> Result<Vec<VendorRef>, SpendError>;

    /// Probe whether the source is reachable. Never errors.
    async fn test_connection(&self) -> bool;

    /// Release pooled resources (database connections and the like). Safe to
    /// call on sources that were never fully initialized.
    async fn close(&self) {}
}
