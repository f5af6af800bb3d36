use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional record filters passed through to source adapters.
///
/// Matching semantics are adapter-specific but consistent within an adapter:
/// `vendor` is a case-insensitive substring everywhere, while
/// `department`/`practice_area` are equality matches in the database adapter
/// and substring matches in the file adapter. Amount bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendFilters {
    pub vendor: Option<String>,
    pub department: Option<String>,
    pub practice_area: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl SpendFilters {
    /// Filter by vendor name substring.
    #[must_use]
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Filter by department.
    #[must_use]
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Filter by practice area.
    #[must_use]
    pub fn practice_area(mut self, practice_area: impl Into<String>) -> Self {
        self.practice_area = Some(practice_area.into());
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vendor.is_none()
            && self.department.is_none()
            && self.practice_area.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
    }

    /// Canonical rendering used in cache keys. Field order is fixed so the
    /// same filters always produce the same token; callers performing manual
    /// cache invalidation rely on this recipe.
    #[must_use]
    pub fn cache_token(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = &self.vendor {
            parts.push(format!("vendor={v}"));
        }
        if let Some(d) = &self.department {
            parts.push(format!("department={d}"));
        }
        if let Some(p) = &self.practice_area {
            parts.push(format!("practice_area={p}"));
        }
        if let Some(m) = &self.min_amount {
            parts.push(format!("min={m}"));
        }
        if let Some(m) = &self.max_amount {
            parts.push(format!("max={m}"));
        }
        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(";")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_token_is_canonical() {
        let a = SpendFilters::default()
            .department("Legal")
            .vendor("Smith");
        let b = SpendFilters::default()
            .vendor("Smith")
            .department("Legal");
        assert_eq!(a.cache_token(), b.cache_token());
        assert_eq!(SpendFilters::default().cache_token(), "-");
    }
}
