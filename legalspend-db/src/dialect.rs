//! Driver-family resolution and connection-string construction.

use legalspend_core::{ConnectionParams, SpendError};

/// Supported database engine families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    SqlServer,
    Oracle,
}

impl Dialect {
    /// Resolve a configured driver string. Anything unrecognized is a
    /// configuration error raised at construction time, before any query.
    pub fn from_driver(driver: &str) -> Result<Self, SpendError> {
        match driver {
            "postgresql" | "postgres" => Ok(Self::Postgres),
            "mssql" => Ok(Self::SqlServer),
            "oracle" => Ok(Self::Oracle),
            other => Err(SpendError::config(format!(
                "unsupported database driver: {other}"
            ))),
        }
    }

    const fn default_port(self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::SqlServer => 1433,
            Self::Oracle => 1521,
        }
    }

    /// Build the driver-specific connection URL from connection parameters.
    ///
    /// # Errors
    /// Returns a configuration error naming the source when a required
    /// parameter is missing.
    pub fn connection_url(
        self,
        source_name: &str,
        params: &ConnectionParams,
    ) -> Result<String, SpendError> {
        let require = |key: &str| {
            params
                .str(key)
                .ok_or_else(|| SpendError::config(format!("{source_name}: missing {key}")))
        };

        let host = require("host")?;
        let username = require("username")?;
        let password = require("password")?;
        let port = params.u16("port").unwrap_or_else(|| self.default_port());

        let url = match self {
            Self::Postgres => {
                let database = require("database")?;
                format!("postgres://{username}:{password}@{host}:{port}/{database}")
            }
            Self::SqlServer => {
                let database = require("database")?;
                format!("mssql://{username}:{password}@{host}:{port}/{database}")
            }
            Self::Oracle => {
                let service_name = require("service_name")?;
                format!("oracle://{username}:{password}@{host}:{port}/{service_name}")
            }
        };
        Ok(url)
    }
}
