use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::VendorType;

/// A vendor as reported by a single source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRef {
    /// Stable content-hash id derived from the vendor name via [`vendor_id`].
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VendorType,
    /// Name of the source that reported the vendor.
    pub source: String,
}

impl VendorRef {
    /// Build a reference with the id derived from `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: VendorType, source: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: vendor_id(&name),
            name,
            kind,
            source: source.into(),
        }
    }
}

/// Derive a stable vendor id from a vendor name.
///
/// The id is a truncated SHA-256 of the case-folded, whitespace-trimmed name,
/// so the same vendor hashes to the same id in every source and across
/// repeated calls. Cross-source deduplication keys on this.
#[must_use]
pub fn vendor_id(name: &str) -> String {
    let normalized = name.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(&digest[..6])
}
