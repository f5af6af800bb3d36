//! Pure aggregation and trend functions over normalized spend records.
//!
//! Everything here is a function of its inputs only; the manager feeds these
//! from whatever record set it assembled. Divide-by-zero situations (zero
//! budget, empty record sets) yield defined neutral results, never errors.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use legalspend_types::{RankedTotal, SpendFilters, SpendRecord, SpendSummary, SpendTrend, TrendDirection};

/// Ranked breakdowns are capped at this many entries.
pub const TOP_N: usize = 5;

/// Month-over-month change beyond which a trend counts as increasing or
/// decreasing, in percent.
pub const TREND_THRESHOLD_PCT: f64 = 10.0;

/// Share of total spend beyond which a single vendor triggers a
/// concentration alert, in percent.
pub const CONCENTRATION_ALERT_PCT: f64 = 40.0;

/// Matter bucket for records that carry no matter name.
const GENERAL_MATTER: &str = "General";

/// Aggregate a record set into a [`SpendSummary`] for the given period.
///
/// An empty set produces a zero summary with the input date range preserved.
/// The summary currency is the first record's; mixed-currency sets are
/// summed without conversion.
#[must_use]
pub fn summarize(records: &[SpendRecord], start: NaiveDate, end: NaiveDate) -> SpendSummary {
    let total_amount: Decimal = records.iter().map(|r| r.amount).sum();
    let currency = records
        .first()
        .map_or_else(|| "USD".to_string(), |r| r.currency.clone());

    let top_vendors = ranked_totals(
        records.iter().map(|r| (r.vendor_name.as_str(), r.amount)),
        TOP_N,
    );
    let top_matters = ranked_totals(
        records
            .iter()
            .map(|r| (r.matter_name.as_deref().unwrap_or(GENERAL_MATTER), r.amount)),
        TOP_N,
    );

    let mut by_department: HashMap<String, Decimal> = HashMap::new();
    let mut by_practice_area: HashMap<String, Decimal> = HashMap::new();
    for record in records {
        *by_department
            .entry(record.department.clone())
            .or_insert(Decimal::ZERO) += record.amount;
        *by_practice_area
            .entry(record.practice_area.as_str().to_string())
            .or_insert(Decimal::ZERO) += record.amount;
    }

    SpendSummary {
        total_amount,
        currency,
        period_start: start,
        period_end: end,
        record_count: records.len(),
        top_vendors,
        top_matters,
        by_department,
        by_practice_area,
    }
}

/// Sum amounts per name, preserving first-appearance order for ties, sorted
/// descending by total and truncated to `cap`.
fn ranked_totals<'a, I>(pairs: I, cap: usize) -> Vec<RankedTotal>
where
    I: Iterator<Item = (&'a str, Decimal)>,
{
    let mut totals: Vec<RankedTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (name, amount) in pairs {
        if let Some(&i) = index.get(name) {
            totals[i].amount += amount;
        } else {
            index.insert(name.to_string(), totals.len());
            totals.push(RankedTotal {
                name: name.to_string(),
                amount,
            });
        }
    }
    // Stable sort keeps input order among equal totals.
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals.truncate(cap);
    totals
}

/// Expense categories ranked by total amount, capped at [`TOP_N`].
#[must_use]
pub fn category_totals(records: &[SpendRecord]) -> Vec<RankedTotal> {
    ranked_totals(
        records
            .iter()
            .map(|r| (r.expense_category.as_str(), r.amount)),
        TOP_N,
    )
}

/// Bucket amounts by calendar month ("YYYY-MM" keys, chronological order).
#[must_use]
pub fn monthly_totals(records: &[SpendRecord]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for record in records {
        let key = record.invoice_date.format("%Y-%m").to_string();
        *totals.entry(key).or_insert(Decimal::ZERO) += record.amount;
    }
    totals
}

/// Classify month-over-month spend movement.
///
/// With fewer than two distinct months the trend is stable with a zero
/// change. Otherwise the change is the percentage difference between the
/// first and last chronological month (not a regression fit), classified at
/// the fixed +/-10% threshold.
#[must_use]
pub fn spend_trend(records: &[SpendRecord]) -> SpendTrend {
    let totals = monthly_totals(records);
    if totals.len() < 2 {
        return SpendTrend::stable(totals);
    }

    // BTreeMap iteration order is chronological for "YYYY-MM" keys.
    let first = totals.values().next().copied().unwrap_or(Decimal::ZERO);
    let last = totals.values().next_back().copied().unwrap_or(Decimal::ZERO);

    let change_percentage = (last - first)
        .checked_div(first)
        .and_then(|ratio| (ratio * Decimal::ONE_HUNDRED).to_f64())
        .unwrap_or(0.0);

    let direction = if change_percentage > TREND_THRESHOLD_PCT {
        TrendDirection::Increasing
    } else if change_percentage < -TREND_THRESHOLD_PCT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    SpendTrend {
        direction,
        change_percentage,
        monthly_totals: totals,
    }
}

/// Case-insensitive transaction search over vendor name, matter name and
/// description (any one matching suffices), with inclusive amount bounds and
/// a result cap. Zero matches yield an empty vector.
#[must_use]
pub fn search_records(
    records: Vec<SpendRecord>,
    term: &str,
    min_amount: Option<Decimal>,
    max_amount: Option<Decimal>,
    limit: usize,
) -> Vec<SpendRecord> {
    let needle = term.to_lowercase();
    let mut matches: Vec<SpendRecord> = records
        .into_iter()
        .filter(|r| {
            r.vendor_name.to_lowercase().contains(&needle)
                || r.matter_name
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase().contains(&needle))
                || r.description.to_lowercase().contains(&needle)
        })
        .filter(|r| min_amount.is_none_or(|min| r.amount >= min))
        .filter(|r| max_amount.is_none_or(|max| r.amount <= max))
        .collect();
    matches.truncate(limit);
    matches
}

/// Substring-style record filtering shared by in-memory adapters: string
/// fields match case-insensitively as substrings, amount bounds are
/// inclusive.
#[must_use]
pub fn matches_filters(record: &SpendRecord, filters: &SpendFilters) -> bool {
    let contains_ci = |haystack: &str, needle: &str| {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    };

    if let Some(vendor) = &filters.vendor {
        if !contains_ci(&record.vendor_name, vendor) {
            return false;
        }
    }
    if let Some(department) = &filters.department {
        if !contains_ci(&record.department, department) {
            return false;
        }
    }
    if let Some(practice_area) = &filters.practice_area {
        if !contains_ci(record.practice_area.as_str(), practice_area) {
            return false;
        }
    }
    if filters.min_amount.is_some_and(|min| record.amount < min) {
        return false;
    }
    if filters.max_amount.is_some_and(|max| record.amount > max) {
        return false;
    }
    true
}

/// Budget variance in percent: `(actual - budget) / budget * 100`, defined
/// as zero when the budget is zero.
#[must_use]
pub fn budget_variance(actual: Decimal, budget: Decimal) -> f64 {
    (actual - budget)
        .checked_div(budget)
        .and_then(|ratio| (ratio * Decimal::ONE_HUNDRED).to_f64())
        .unwrap_or(0.0)
}

/// The vendor carrying the largest share of the set's total spend, with its
/// share in percent. `None` for empty or zero-total sets.
#[must_use]
pub fn vendor_concentration(records: &[SpendRecord]) -> Option<(String, f64)> {
    let total: Decimal = records.iter().map(|r| r.amount).sum();
    if total.is_zero() {
        return None;
    }

    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for record in records {
        *totals
            .entry(record.vendor_name.as_str())
            .or_insert(Decimal::ZERO) += record.amount;
    }
    // Name as tie-break keeps the result deterministic across runs.
    let (name, amount) = totals
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;
    let share = (amount.checked_div(total))
        .and_then(|ratio| (ratio * Decimal::ONE_HUNDRED).to_f64())
        .unwrap_or(0.0);
    Some((name.to_string(), share))
}

/// Fixed recommendation text by variance band, plus a vendor-concentration
/// flag when a single vendor exceeds [`CONCENTRATION_ALERT_PCT`] of the
/// set's total.
#[must_use]
pub fn budget_recommendations(
    variance_pct: f64,
    records: &[SpendRecord],
    tolerance_pct: f64,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if variance_pct > tolerance_pct {
        recommendations.push(format!(
            "Spending is {variance_pct:.1}% over budget. Review the largest matters and \
             consider renegotiating rates with top vendors."
        ));
    } else if variance_pct < -tolerance_pct {
        recommendations.push(format!(
            "Spending is {:.1}% under budget. Confirm all expected invoices have been \
             received before reallocating the remainder.",
            variance_pct.abs()
        ));
    } else {
        recommendations.push(format!(
            "Spending is within {tolerance_pct:.0}% of budget. No corrective action needed."
        ));
    }

    if let Some((vendor, share)) = vendor_concentration(records) {
        if share > CONCENTRATION_ALERT_PCT {
            recommendations.push(format!(
                "{vendor} accounts for {share:.1}% of spend in this period. Consider \
                 diversifying vendor allocation."
            ));
        }
    }

    recommendations
}
