//! Column-name based row normalization shared by the CSV and Excel readers.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use legalspend_core::{PracticeArea, SpendError, SpendRecord, VendorType};

/// One raw row, keyed by lowercased column header.
pub(crate) struct RawRow(HashMap<String, String>);

impl RawRow {
    pub(crate) fn new(headers: &[String], cells: Vec<String>) -> Self {
        let mut fields = HashMap::with_capacity(headers.len());
        for (header, cell) in headers.iter().zip(cells) {
            fields.insert(header.to_lowercase(), cell);
        }
        Self(fields)
    }

    /// First non-empty value among the given column aliases.
    fn first(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|n| self.0.get(*n))
            .map(String::as_str)
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.first(&[name]).map(str::to_string)
    }

    fn date(&self, name: &str) -> Option<NaiveDate> {
        self.first(&[name]).and_then(parse_date)
    }

    /// Normalize into a [`SpendRecord`], defaulting optional fields the same
    /// way the other adapters do.
    ///
    /// # Errors
    /// Returns a data error when the invoice date is missing or unparseable
    /// or the amount is not a decimal; callers skip such rows.
    pub(crate) fn into_record(self, source_system: &str) -> Result<SpendRecord, SpendError> {
        let invoice_date = self
            .date("invoice_date")
            .ok_or_else(|| SpendError::data("missing or unparseable invoice_date"))?;
        let amount = match self.first(&["amount"]) {
            Some(raw) => Decimal::from_str(raw)
                .map_err(|e| SpendError::data(format!("amount '{raw}': {e}")))?,
            None => Decimal::ZERO,
        };

        let metadata = self.first(&["metadata"]).and_then(|raw| {
            match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
                Ok(map) => Some(map),
                Err(e) => {
                    warn!(error = %e, "ignoring unparseable metadata column");
                    None
                }
            }
        });

        Ok(SpendRecord {
            invoice_id: self
                .first(&["invoice_id", "id"])
                .unwrap_or("N/A")
                .to_string(),
            vendor_name: self
                .first(&["vendor_name", "vendor"])
                .unwrap_or("Unknown")
                .to_string(),
            vendor_type: self
                .first(&["vendor_type"])
                .map_or(VendorType::LawFirm, VendorType::parse_lenient),
            matter_id: self.optional("matter_id"),
            matter_name: self.optional("matter_name"),
            department: self
                .first(&["department"])
                .unwrap_or("Legal")
                .to_string(),
            practice_area: self
                .first(&["practice_area"])
                .map_or(PracticeArea::General, PracticeArea::parse_lenient),
            invoice_date,
            amount,
            currency: self.first(&["currency"]).unwrap_or("USD").to_string(),
            expense_category: self
                .first(&["expense_category"])
                .unwrap_or("Legal Services")
                .to_string(),
            description: self.first(&["description"]).unwrap_or("").to_string(),
            billing_period_start: self.date("billing_period_start"),
            billing_period_end: self.date("billing_period_end"),
            status: self.first(&["status"]).unwrap_or("approved").to_string(),
            budget_code: self.optional("budget_code"),
            source_system: Some(source_system.to_string()),
            metadata,
        })
    }
}

/// Accept ISO dates first, then the common US spreadsheet format.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}
