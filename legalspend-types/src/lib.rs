//! Domain model shared across the legalspend workspace.
//!
//! Everything here is plain data: records normalized by the source adapters,
//! the aggregate/report shapes produced by the manager, and the configuration
//! types the composition root feeds into source construction. No I/O lives in
//! this crate.

mod config;
mod filters;
mod record;
mod reports;
mod summary;
mod vendor;

pub use config::{ConnectionParams, SourceConfig, SourceKind};
pub use filters::SpendFilters;
pub use record::{PracticeArea, SpendRecord, VendorType};
pub use reports::{
    ConnectionStatus, SourceStatus, SpendCategories, SpendOverview, VendorBenchmarks,
};
pub use summary::{RankedTotal, SpendSummary, SpendTrend, TrendDirection};
pub use vendor::{vendor_id, VendorRef};
