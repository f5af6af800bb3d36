//! Multi-source legal-spend aggregation and analytics.
//!
//! The [`SpendManager`] orchestrates a set of pluggable source adapters
//! (remote invoice APIs, relational databases, flat-file exports), fanning
//! queries out concurrently, merging and deduplicating results, caching
//! aggregates, and deriving summaries, trends and budget analytics from the
//! normalized records.
//!
//! ```no_run
//! use legalspend::{config, SpendManager};
//!
//! # async fn run() -> Result<(), legalspend::SpendError> {
//! let mut manager = SpendManager::builder().build()?;
//! manager.initialize_sources(&config::sources_from_env()).await;
//!
//! let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
//! let records = manager.get_spend_data(start, end, None, None).await;
//! let summary = manager.generate_summary(&records, start, end);
//! println!("{} records, {} {}", summary.record_count, summary.total_amount, summary.currency);
//!
//! manager.cleanup().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod manager;
mod placeholder;
mod registry;

pub use manager::{
    SpendManager, SpendManagerBuilder, DEFAULT_BUDGET_TOLERANCE_PCT, DEFAULT_CACHE_TTL,
};
pub use placeholder::{PlaceholderSource, PLACEHOLDER_INTEGRATIONS};
pub use registry::default_registry;

// Surface the core seams so embedders need only this crate.
pub use legalspend_core::{
    analytics, RateLimiter, SourceRegistry, SpendCache, SpendError, SpendSource,
};
pub use legalspend_types::{
    ConnectionParams, ConnectionStatus, PracticeArea, RankedTotal, SourceConfig, SourceKind,
    SourceStatus, SpendFilters, SpendRecord, SpendSummary, SpendTrend, TrendDirection, VendorRef,
    VendorType,
};
