//! Source configuration consumed at composition time.

use serde::{Deserialize, Serialize};

/// Broad category of a data source, used for registry key resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Api,
    Database,
    File,
}

impl SourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Database => "database",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form connection parameters whose required keys depend on the source
/// kind and name. Each adapter constructor validates the keys it needs and
/// reports missing ones as configuration errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParams(serde_json::Map<String, serde_json::Value>);

impl ConnectionParams {
    #[must_use]
    pub const fn new(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }

    /// String-valued parameter, if present and a string.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    /// String-valued parameter with a default.
    #[must_use]
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// Unsigned integer parameter. Accepts JSON numbers and numeric strings,
    /// since environment-sourced configuration arrives as text.
    #[must_use]
    pub fn u64(&self, key: &str) -> Option<u64> {
        match self.0.get(key) {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn u16(&self, key: &str) -> Option<u16> {
        self.u64(key).and_then(|v| u16::try_from(v).ok())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace a parameter. Used by configuration builders.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ConnectionParams {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// Configuration for one data source, created once at startup and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique identifier, e.g. "legaltracker" or "postgres_legal".
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub enabled: bool,
    pub connection_params: ConnectionParams,
}

impl SourceConfig {
    /// Registration key under which this source's adapter is looked up:
    /// API sources register per integration name, database and file sources
    /// share one adapter per kind.
    #[must_use]
    pub fn registration_key(&self) -> String {
        match self.kind {
            SourceKind::Api => self.name.to_lowercase(),
            SourceKind::Database | SourceKind::File => self.kind.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: serde_json::Value) -> ConnectionParams {
        match v {
            serde_json::Value::Object(map) => ConnectionParams::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn numeric_params_accept_strings() {
        let p = params(json!({"port": "5432", "timeout": 30}));
        assert_eq!(p.u16("port"), Some(5432));
        assert_eq!(p.u64("timeout"), Some(30));
        assert_eq!(p.u64("missing"), None);
    }

    #[test]
    fn registration_key_follows_kind_policy() {
        let api = SourceConfig {
            name: "LegalTracker".into(),
            kind: SourceKind::Api,
            enabled: true,
            connection_params: ConnectionParams::default(),
        };
        assert_eq!(api.registration_key(), "legaltracker");

        let db = SourceConfig {
            name: "sap_erp".into(),
            kind: SourceKind::Database,
            enabled: true,
            connection_params: ConnectionParams::default(),
        };
        assert_eq!(db.registration_key(), "database");
    }
}
