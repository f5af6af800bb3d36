//! Known-but-not-yet-supported integrations.
//!
//! These satisfy the full source contract (empty data, failing probe) so the
//! initialization loop treats them uniformly as configured-but-inactive
//! instead of special-casing them.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use legalspend_core::{
    SourceConfig, SourceKind, SpendError, SpendFilters, SpendRecord, SpendSource, VendorRef,
};

/// Registration keys and display labels of integrations that have a
/// configuration surface but no adapter yet.
pub const PLACEHOLDER_INTEGRATIONS: &[(&str, &str)] = &[
    ("simplelegal", "SimpleLegal"),
    ("brightflag", "Brightflag"),
    ("tymetrix", "TyMetrix 360"),
    ("onit", "Onit"),
    ("dynamics365", "Microsoft Dynamics 365"),
    ("netsuite", "NetSuite"),
];

/// Contract-complete stand-in for an unimplemented integration.
pub struct PlaceholderSource {
    name: String,
    integration: &'static str,
}

impl PlaceholderSource {
    #[must_use]
    pub fn new(name: impl Into<String>, integration: &'static str) -> Self {
        Self {
            name: name.into(),
            integration,
        }
    }

    /// Build from configuration, for registry factories.
    #[must_use]
    pub fn from_config(config: &SourceConfig, integration: &'static str) -> Self {
        Self::new(config.name.clone(), integration)
    }
}

#[async_trait]
impl SpendSource for PlaceholderSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Api
    }

    async fn spend_data(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
        _filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        warn!(integration = self.integration, "integration is not yet implemented");
        Ok(vec![])
    }

    async fn vendors(&self) -> Result<Vec<VendorRef>, SpendError> {
        warn!(integration = self.integration, "integration is not yet implemented");
        Ok(vec![])
    }

    async fn test_connection(&self) -> bool {
        warn!(integration = self.integration, "integration is not yet implemented");
        false
    }
}
