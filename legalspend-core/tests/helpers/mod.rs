#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use legalspend_core::{PracticeArea, SpendRecord, VendorType};

/// Minimal record constructor for analytics tests.
pub fn record(vendor: &str, date: &str, amount: &str) -> SpendRecord {
    SpendRecord {
        invoice_id: format!("INV-{vendor}-{date}"),
        vendor_name: vendor.to_string(),
        vendor_type: VendorType::LawFirm,
        matter_id: None,
        matter_name: None,
        department: "Legal".to_string(),
        practice_area: PracticeArea::General,
        invoice_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        amount: Decimal::from_str(amount).unwrap(),
        currency: "USD".to_string(),
        expense_category: "Legal Services".to_string(),
        description: String::new(),
        billing_period_start: None,
        billing_period_end: None,
        status: "approved".to_string(),
        budget_code: None,
        source_system: None,
        metadata: None,
    }
}

pub fn record_with(
    vendor: &str,
    date: &str,
    amount: &str,
    matter: Option<&str>,
    department: &str,
    practice_area: PracticeArea,
) -> SpendRecord {
    let mut r = record(vendor, date, amount);
    r.matter_name = matter.map(str::to_string);
    r.department = department.to_string();
    r.practice_area = practice_area;
    r
}
