//! Report shapes produced by the manager's status and analytics surface.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{RankedTotal, SourceKind, SpendTrend};

/// Live connectivity state of a retained source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Disconnected,
}

/// Snapshot of one configured source, as reported by a live re-probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub status: ConnectionStatus,
    pub enabled: bool,
}

/// Industry benchmark payload for a vendor.
///
/// Benchmark data requires an external comparables feed that is not wired
/// up; the payload is explicit about being unavailable instead of inventing
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorBenchmarks {
    pub vendor_name: String,
    pub available: bool,
    pub note: String,
}

impl VendorBenchmarks {
    #[must_use]
    pub fn unavailable(vendor_name: impl Into<String>) -> Self {
        Self {
            vendor_name: vendor_name.into(),
            available: false,
            note: "industry benchmark data is not connected for this deployment".to_string(),
        }
    }
}

/// Distinct categorization values observed across sources, with a coarse
/// data-completeness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendCategories {
    pub expense_categories: Vec<String>,
    pub practice_areas: Vec<String>,
    pub departments: Vec<String>,
    pub matter_types: Vec<String>,
    /// Share of sampled records carrying both a matter name and a budget
    /// code, in [0, 1].
    pub completeness_score: f64,
}

/// Recent-activity overview combining totals, rankings and alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendOverview {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_spend: Decimal,
    pub transaction_count: usize,
    pub active_vendors: usize,
    pub top_categories: Vec<RankedTotal>,
    pub alerts: Vec<String>,
    pub trend: SpendTrend,
}
