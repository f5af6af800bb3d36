use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named total used in ranked breakdowns (top vendors, top matters,
/// top categories).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTotal {
    pub name: String,
    pub amount: Decimal,
}

/// Aggregate view of a record set over a date range.
///
/// `currency` is taken from the first record in the set; mixed-currency
/// inputs are summed without conversion. That is a known limitation of the
/// aggregation layer, surfaced here rather than papered over with invented
/// exchange rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendSummary {
    pub total_amount: Decimal,
    pub currency: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub record_count: usize,
    /// Up to five vendors, descending by summed amount. Ties keep the order
    /// in which the vendors first appeared in the input.
    pub top_vendors: Vec<RankedTotal>,
    /// Up to five matters, descending by summed amount. Records with no
    /// matter name are bucketed under "General".
    pub top_matters: Vec<RankedTotal>,
    pub by_department: HashMap<String, Decimal>,
    pub by_practice_area: HashMap<String, Decimal>,
}

/// Direction of month-over-month spend movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Month-bucketed spend movement between the first and last calendar month
/// present in a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendTrend {
    pub direction: TrendDirection,
    /// Percentage change between the first and last chronological month.
    pub change_percentage: f64,
    /// Totals keyed by "YYYY-MM"; the key format keeps the map ordered
    /// chronologically.
    pub monthly_totals: BTreeMap<String, Decimal>,
}

impl SpendTrend {
    /// Neutral trend used for empty or single-month record sets.
    #[must_use]
    pub fn stable(monthly_totals: BTreeMap<String, Decimal>) -> Self {
        Self {
            direction: TrendDirection::Stable,
            change_percentage: 0.0,
            monthly_totals,
        }
    }
}
