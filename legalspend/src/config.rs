//! Environment-driven source configuration.
//!
//! One block of variables per supported integration, each gated by an
//! `*_ENABLED` flag. The transport layer calls [`sources_from_env`] once at
//! startup and hands the result to
//! [`SpendManager::initialize_sources`](crate::SpendManager::initialize_sources).

use legalspend_core::{ConnectionParams, SourceConfig, SourceKind};

/// Read source configurations from process environment variables.
#[must_use]
pub fn sources_from_env() -> Vec<SourceConfig> {
    sources_from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`sources_from_env`] but with an injectable variable lookup, so
/// configuration assembly is testable without mutating the process
/// environment.
pub fn sources_from_lookup<F>(get: F) -> Vec<SourceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let enabled = |key: &str| {
        get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
    let mut configs = Vec::new();

    if enabled("LEGALTRACKER_ENABLED") {
        let mut params = ConnectionParams::default();
        if let Some(api_key) = get("LEGALTRACKER_API_KEY") {
            params.set("api_key", api_key);
        }
        params.set(
            "base_url",
            get("LEGALTRACKER_BASE_URL")
                .unwrap_or_else(|| "https://api.legaltracker.com".to_string()),
        );
        params.set("timeout", get("LEGALTRACKER_TIMEOUT").unwrap_or_else(|| "30".to_string()));
        configs.push(SourceConfig {
            name: "legaltracker".to_string(),
            kind: SourceKind::Api,
            enabled: true,
            connection_params: params,
        });
    }

    if enabled("SAP_ENABLED") {
        let mut params = ConnectionParams::default();
        params.set("driver", "mssql");
        copy_var(&get, &mut params, "host", "SAP_HOST");
        params.set("port", get("SAP_PORT").unwrap_or_else(|| "1433".to_string()));
        copy_var(&get, &mut params, "database", "SAP_DATABASE");
        copy_var(&get, &mut params, "username", "SAP_USER");
        copy_var(&get, &mut params, "password", "SAP_PASSWORD");
        params.set("schema", get("SAP_SCHEMA").unwrap_or_else(|| "dbo".to_string()));
        configs.push(SourceConfig {
            name: "sap_erp".to_string(),
            kind: SourceKind::Database,
            enabled: true,
            connection_params: params,
        });
    }

    if enabled("ORACLE_ENABLED") {
        let mut params = ConnectionParams::default();
        params.set("driver", "oracle");
        copy_var(&get, &mut params, "host", "ORACLE_HOST");
        params.set("port", get("ORACLE_PORT").unwrap_or_else(|| "1521".to_string()));
        copy_var(&get, &mut params, "service_name", "ORACLE_SERVICE");
        copy_var(&get, &mut params, "username", "ORACLE_USER");
        copy_var(&get, &mut params, "password", "ORACLE_PASSWORD");
        configs.push(SourceConfig {
            name: "oracle_erp".to_string(),
            kind: SourceKind::Database,
            enabled: true,
            connection_params: params,
        });
    }

    if enabled("POSTGRES_ENABLED") {
        let mut params = ConnectionParams::default();
        params.set("driver", "postgresql");
        copy_var(&get, &mut params, "host", "POSTGRES_HOST");
        params.set("port", get("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string()));
        copy_var(&get, &mut params, "database", "POSTGRES_DB");
        copy_var(&get, &mut params, "username", "POSTGRES_USER");
        copy_var(&get, &mut params, "password", "POSTGRES_PASSWORD");
        configs.push(SourceConfig {
            name: "postgres_legal".to_string(),
            kind: SourceKind::Database,
            enabled: true,
            connection_params: params,
        });
    }

    if enabled("CSV_ENABLED") {
        let mut params = ConnectionParams::default();
        params.set("file_type", "csv");
        copy_var(&get, &mut params, "file_path", "CSV_FILE_PATH");
        params.set("encoding", get("CSV_ENCODING").unwrap_or_else(|| "utf-8".to_string()));
        params.set("delimiter", get("CSV_DELIMITER").unwrap_or_else(|| ",".to_string()));
        configs.push(SourceConfig {
            name: "csv_import".to_string(),
            kind: SourceKind::File,
            enabled: true,
            connection_params: params,
        });
    }

    if enabled("EXCEL_ENABLED") {
        let mut params = ConnectionParams::default();
        params.set("file_type", "excel");
        copy_var(&get, &mut params, "file_path", "EXCEL_FILE_PATH");
        params.set(
            "sheet_name",
            get("EXCEL_SHEET_NAME").unwrap_or_else(|| "Sheet1".to_string()),
        );
        configs.push(SourceConfig {
            name: "excel_import".to_string(),
            kind: SourceKind::File,
            enabled: true,
            connection_params: params,
        });
    }

    configs
}

fn copy_var<F>(get: &F, params: &mut ConnectionParams, param: &str, var: &str)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = get(var) {
        params.set(param, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn disabled_blocks_produce_nothing() {
        let configs = sources_from_lookup(lookup(&[("LEGALTRACKER_ENABLED", "false")]));
        assert!(configs.is_empty());
    }

    #[test]
    fn tracker_block_builds_api_config_with_defaults() {
        let configs = sources_from_lookup(lookup(&[
            ("LEGALTRACKER_ENABLED", "true"),
            ("LEGALTRACKER_API_KEY", "key-1"),
        ]));
        assert_eq!(configs.len(), 1);
        let cfg = &configs[0];
        assert_eq!(cfg.name, "legaltracker");
        assert_eq!(cfg.kind, SourceKind::Api);
        assert_eq!(
            cfg.connection_params.str("base_url"),
            Some("https://api.legaltracker.com")
        );
        assert_eq!(cfg.connection_params.u64("timeout"), Some(30));
    }

    #[test]
    fn database_blocks_carry_driver_and_ports() {
        let configs = sources_from_lookup(lookup(&[
            ("SAP_ENABLED", "true"),
            ("SAP_HOST", "sap.internal"),
            ("SAP_DATABASE", "spend"),
            ("SAP_USER", "svc"),
            ("SAP_PASSWORD", "secret"),
            ("POSTGRES_ENABLED", "true"),
            ("POSTGRES_HOST", "pg.internal"),
            ("POSTGRES_DB", "legal"),
            ("POSTGRES_USER", "svc"),
            ("POSTGRES_PASSWORD", "secret"),
        ]));
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].connection_params.str("driver"), Some("mssql"));
        assert_eq!(configs[0].connection_params.u16("port"), Some(1433));
        assert_eq!(configs[1].connection_params.str("driver"), Some("postgresql"));
        assert_eq!(configs[1].connection_params.u16("port"), Some(5432));
    }

    #[test]
    fn file_blocks_resolve_by_kind() {
        let configs = sources_from_lookup(lookup(&[
            ("CSV_ENABLED", "true"),
            ("CSV_FILE_PATH", "/data/spend.csv"),
        ]));
        assert_eq!(configs[0].registration_key(), "file");
        assert_eq!(
            configs[0].connection_params.str("file_path"),
            Some("/data/spend.csv")
        );
    }
}
