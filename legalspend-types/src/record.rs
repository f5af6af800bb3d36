use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of vendor an invoice was issued by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VendorType {
    #[serde(rename = "Law Firm")]
    LawFirm,
    #[serde(rename = "Consultant")]
    Consultant,
    #[serde(rename = "Expert Witness")]
    ExpertWitness,
    #[serde(rename = "Court Reporter")]
    CourtReporter,
    #[serde(rename = "eDiscovery Vendor")]
    EDiscoveryVendor,
    #[serde(rename = "Hosting Provider")]
    HostingProvider,
    #[serde(rename = "Forensics")]
    Forensics,
    #[default]
    #[serde(rename = "Other")]
    Other,
}

impl VendorType {
    /// Human-readable label, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LawFirm => "Law Firm",
            Self::Consultant => "Consultant",
            Self::ExpertWitness => "Expert Witness",
            Self::CourtReporter => "Court Reporter",
            Self::EDiscoveryVendor => "eDiscovery Vendor",
            Self::HostingProvider => "Hosting Provider",
            Self::Forensics => "Forensics",
            Self::Other => "Other",
        }
    }

    /// Parse a label from upstream data, falling back to [`VendorType::Other`]
    /// for anything unrecognized. Ingestion never rejects a row over this
    /// field.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim() {
            "Law Firm" => Self::LawFirm,
            "Consultant" => Self::Consultant,
            "Expert Witness" => Self::ExpertWitness,
            "Court Reporter" => Self::CourtReporter,
            "eDiscovery Vendor" => Self::EDiscoveryVendor,
            "Hosting Provider" => Self::HostingProvider,
            "Forensics" => Self::Forensics,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for VendorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Practice area an invoice line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PracticeArea {
    #[serde(rename = "Litigation")]
    Litigation,
    #[serde(rename = "Corporate")]
    Corporate,
    #[serde(rename = "Employment")]
    Employment,
    #[serde(rename = "Intellectual Property")]
    IntellectualProperty,
    #[serde(rename = "Regulatory")]
    Regulatory,
    #[serde(rename = "Real Estate")]
    RealEstate,
    #[serde(rename = "Tax")]
    Tax,
    #[default]
    #[serde(rename = "General")]
    General,
}

impl PracticeArea {
    /// Human-readable label, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Litigation => "Litigation",
            Self::Corporate => "Corporate",
            Self::Employment => "Employment",
            Self::IntellectualProperty => "Intellectual Property",
            Self::Regulatory => "Regulatory",
            Self::RealEstate => "Real Estate",
            Self::Tax => "Tax",
            Self::General => "General",
        }
    }

    /// Parse a label from upstream data, falling back to
    /// [`PracticeArea::General`] for anything unrecognized.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim() {
            "Litigation" => Self::Litigation,
            "Corporate" => Self::Corporate,
            "Employment" => Self::Employment,
            "Intellectual Property" => Self::IntellectualProperty,
            "Regulatory" => Self::Regulatory,
            "Real Estate" => Self::RealEstate,
            "Tax" => Self::Tax,
            _ => Self::General,
        }
    }
}

impl std::fmt::Display for PracticeArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized invoice line, the unit every source adapter produces.
///
/// Records are created by an adapter while translating a raw row, JSON object
/// or API response and are never mutated afterwards. Amounts are exact
/// decimals; a well-formed record carries a non-negative `amount`, which is
/// an ingestion-time responsibility rather than a constructor guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    /// Invoice identifier, unique within its source system.
    pub invoice_id: String,
    pub vendor_name: String,
    pub vendor_type: VendorType,
    pub matter_id: Option<String>,
    pub matter_name: Option<String>,
    pub department: String,
    pub practice_area: PracticeArea,
    pub invoice_date: NaiveDate,
    /// Exact decimal amount. Never a binary float.
    pub amount: Decimal,
    /// ISO currency code, e.g. "USD".
    pub currency: String,
    pub expense_category: String,
    pub description: String,
    pub billing_period_start: Option<NaiveDate>,
    pub billing_period_end: Option<NaiveDate>,
    /// Workflow status; defaults to "approved".
    pub status: String,
    pub budget_code: Option<String>,
    /// Provenance tag identifying the producing source, e.g. "File-csv".
    pub source_system: Option<String>,
    /// Free-form extra attributes carried through from the source.
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_type_roundtrips_through_label() {
        for vt in [
            VendorType::LawFirm,
            VendorType::EDiscoveryVendor,
            VendorType::Forensics,
        ] {
            assert_eq!(VendorType::parse_lenient(vt.as_str()), vt);
        }
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(VendorType::parse_lenient("Caterer"), VendorType::Other);
        assert_eq!(
            PracticeArea::parse_lenient("Maritime"),
            PracticeArea::General
        );
    }

    #[test]
    fn enum_serde_uses_human_labels() {
        let json = serde_json::to_string(&PracticeArea::IntellectualProperty).unwrap();
        assert_eq!(json, "\"Intellectual Property\"");
    }
}
