//! Core seams of the legalspend workspace: the [`SpendSource`] trait every
//! adapter implements, the adapter [`registry`](SourceRegistry), the
//! in-process [`RateLimiter`] and TTL [`SpendCache`] utilities, and the pure
//! [`analytics`] functions the manager builds its reports from.

pub mod analytics;
mod cache;
mod error;
mod limit;
mod registry;
pub mod source;

pub use cache::SpendCache;
pub use error::SpendError;
pub use limit::RateLimiter;
pub use registry::{SourceFactory, SourceRegistry};
pub use source::SpendSource;

// Re-export the domain model so adapter crates can depend on a single crate.
pub use legalspend_types as types;
pub use legalspend_types::{
    vendor_id, ConnectionParams, ConnectionStatus, PracticeArea, RankedTotal, SourceConfig,
    SourceKind, SourceStatus, SpendFilters, SpendRecord, SpendSummary, SpendTrend, TrendDirection,
    VendorRef, VendorType,
};
