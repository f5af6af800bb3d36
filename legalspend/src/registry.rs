//! Built-in adapter registrations.
//!
//! Registration is an explicit composition-time call rather than an
//! import-time side effect, so the dispatch table is populated exactly once
//! and in one visible place.

use std::sync::Arc;

use legalspend_core::{RateLimiter, SourceRegistry, SpendError, SpendSource};
use legalspend_db::DbSource;
use legalspend_file::FileSource;
use legalspend_tracker::TrackerSource;

use crate::placeholder::{PlaceholderSource, PLACEHOLDER_INTEGRATIONS};

/// Registry populated with every built-in adapter.
///
/// API integrations register under their specific name, database and file
/// adapters under their generic kind. The shared rate limiter is injected
/// into every API factory so remote sources throttle against a common,
/// per-credential budget owned by the composition root.
///
/// # Errors
/// Returns a configuration error if a key is registered twice, which would
/// indicate a wiring bug.
pub fn default_registry(limiter: Arc<RateLimiter>) -> Result<SourceRegistry, SpendError> {
    let mut registry = SourceRegistry::new();

    registry.register("legaltracker", move |config| {
        let source: Arc<dyn SpendSource> = Arc::new(TrackerSource::new(config, limiter.clone())?);
        Ok(source)
    })?;

    registry.register("database", |config| {
        let source: Arc<dyn SpendSource> = Arc::new(DbSource::new(config)?);
        Ok(source)
    })?;

    registry.register("file", |config| {
        let source: Arc<dyn SpendSource> = Arc::new(FileSource::new(config)?);
        Ok(source)
    })?;

    for (key, integration) in PLACEHOLDER_INTEGRATIONS {
        registry.register(*key, move |config| {
            let source: Arc<dyn SpendSource> =
                Arc::new(PlaceholderSource::from_config(config, integration));
            Ok(source)
        })?;
    }

    Ok(registry)
}
