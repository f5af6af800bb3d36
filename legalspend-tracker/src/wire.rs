//! Wire shapes of the LegalTracker REST API.
//!
//! Invoice objects are decoded individually from raw JSON values so one
//! malformed entry never fails the whole page.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use legalspend_core::{PracticeArea, SpendRecord, VendorType};

#[derive(Debug, Deserialize)]
pub(crate) struct InvoicePage {
    #[serde(default)]
    pub invoices: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VendorPage {
    #[serde(default)]
    pub vendors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireInvoice {
    pub id: String,
    pub vendor: WireVendor,
    #[serde(default)]
    pub matter: Option<WireMatter>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub practice_area: Option<String>,
    pub invoice_date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub expense_category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub billing_period_start: Option<NaiveDate>,
    #[serde(default)]
    pub billing_period_end: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireVendor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMatter {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl WireInvoice {
    /// Normalize into a [`SpendRecord`], defaulting the optional
    /// categorization fields the same way the other adapters do.
    pub(crate) fn into_record(self, source_system: &str) -> SpendRecord {
        let (matter_id, matter_name) = self
            .matter
            .map_or((None, None), |m| (m.id, m.name));
        SpendRecord {
            invoice_id: self.id,
            vendor_type: self
                .vendor
                .kind
                .as_deref()
                .map_or(VendorType::LawFirm, VendorType::parse_lenient),
            vendor_name: self.vendor.name,
            matter_id,
            matter_name,
            department: self.department.unwrap_or_else(|| "Legal".to_string()),
            practice_area: self
                .practice_area
                .as_deref()
                .map_or(PracticeArea::General, PracticeArea::parse_lenient),
            invoice_date: self.invoice_date,
            amount: self.amount,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            expense_category: self
                .expense_category
                .unwrap_or_else(|| "Legal Services".to_string()),
            description: self.description.unwrap_or_default(),
            billing_period_start: self.billing_period_start,
            billing_period_end: self.billing_period_end,
            status: self.status.unwrap_or_else(|| "approved".to_string()),
            budget_code: self.budget_code,
            source_system: Some(source_system.to_string()),
            metadata: None,
        }
    }
}
