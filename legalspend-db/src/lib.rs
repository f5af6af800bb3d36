//! Relational database connector.
//!
//! One adapter serves every `database`-kind configuration, parameterized by
//! its connection parameters. Driver resolution and connection-string
//! construction cover the PostgreSQL, SQL-Server and Oracle families;
//! unknown drivers are rejected at construction time. Queries execute
//! through a lazily-connected PostgreSQL pool. The SQL-Server and Oracle
//! families validate their configuration but report as disconnected until an
//! executing backend is wired up, so the manager treats them uniformly as
//! configured-but-inactive.
//!
//! Every predicate derived from caller input is a bound parameter; user
//! values are never interpolated into SQL text.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::{debug, warn};

use legalspend_core::{
    vendor_id, PracticeArea, SourceConfig, SourceKind, SpendError, SpendFilters, SpendRecord,
    SpendSource, VendorRef, VendorType,
};

mod dialect;

pub use dialect::Dialect;

const DEFAULT_TABLE: &str = "legal_spend";
const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connector for relational legal-spend stores.
#[derive(Debug)]
pub struct DbSource {
    name: String,
    dialect: Dialect,
    table: String,
    pool: Option<PgPool>,
}

impl DbSource {
    /// Build a connector from configuration. Requires `driver`, `host`,
    /// `username`, `password` and `database` (`service_name` for Oracle)
    /// connection parameters; `table` defaults to `legal_spend`.
    ///
    /// No I/O happens here: the PostgreSQL pool connects lazily on first
    /// use.
    ///
    /// # Errors
    /// Returns a configuration error for an unknown driver, a missing
    /// parameter, or an invalid table identifier.
    pub fn new(config: &SourceConfig) -> Result<Self, SpendError> {
        let params = &config.connection_params;
        let driver = params
            .str("driver")
            .ok_or_else(|| SpendError::config(format!("{}: missing driver", config.name)))?;
        let dialect = Dialect::from_driver(driver)?;
        let url = dialect.connection_url(&config.name, params)?;

        let table = params.str_or("table", DEFAULT_TABLE).to_string();
        // The table name is spliced into SQL text, so restrict it to a plain
        // identifier even though it comes from deploy-time configuration.
        if !table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(SpendError::config(format!(
                "{}: invalid table identifier '{table}'",
                config.name
            )));
        }

        let pool = match dialect {
            Dialect::Postgres => {
                let options: PgConnectOptions = url
                    .parse()
                    .map_err(|e| SpendError::config(format!("{}: {e}", config.name)))?;
                Some(
                    PgPoolOptions::new()
                        .max_connections(MAX_CONNECTIONS)
                        .acquire_timeout(ACQUIRE_TIMEOUT)
                        .connect_lazy_with(options),
                )
            }
            Dialect::SqlServer | Dialect::Oracle => None,
        };

        Ok(Self {
            name: config.name.clone(),
            dialect,
            table,
            pool,
        })
    }

    /// Engine family this source was configured for.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch_records(
        &self,
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT invoice_id, vendor_name, vendor_type, matter_id, matter_name, \
             department, practice_area, invoice_date, amount, currency, \
             expense_category, description, billing_period_start, billing_period_end, \
             status, budget_code FROM ",
        );
        query.push(&self.table);
        query.push(" WHERE status = 'approved' AND invoice_date >= ");
        query.push_bind(start);
        query.push(" AND invoice_date <= ");
        query.push_bind(end);

        if let Some(filters) = filters {
            if let Some(vendor) = &filters.vendor {
                query.push(" AND vendor_name ILIKE ");
                query.push_bind(format!("%{vendor}%"));
            }
            if let Some(department) = &filters.department {
                query.push(" AND LOWER(department) = LOWER(");
                query.push_bind(department.clone());
                query.push(")");
            }
            if let Some(practice_area) = &filters.practice_area {
                query.push(" AND LOWER(practice_area) = LOWER(");
                query.push_bind(practice_area.clone());
                query.push(")");
            }
            if let Some(min) = filters.min_amount {
                query.push(" AND amount >= ");
                query.push_bind(min);
            }
            if let Some(max) = filters.max_amount {
                query.push(" AND amount <= ");
                query.push_bind(max);
            }
        }
        query.push(" ORDER BY invoice_date");

        let rows = query
            .build()
            .fetch_all(pool)
            .await
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match self.record_from_row(&row) {
                Ok(record) => records.push(record),
                Err(e) => warn!(source = %self.name, error = %e, "skipping malformed row"),
            }
        }
        debug!(source = %self.name, count = records.len(), "fetched spend rows");
        Ok(records)
    }

    fn record_from_row(&self, row: &PgRow) -> Result<SpendRecord, sqlx::Error> {
        let vendor_type = row
            .try_get::<Option<String>, _>("vendor_type")?
            .as_deref()
            .map_or(VendorType::LawFirm, VendorType::parse_lenient);
        let practice_area = row
            .try_get::<Option<String>, _>("practice_area")?
            .as_deref()
            .map_or(PracticeArea::General, PracticeArea::parse_lenient);

        Ok(SpendRecord {
            invoice_id: row.try_get("invoice_id")?,
            vendor_name: row.try_get("vendor_name")?,
            vendor_type,
            matter_id: row.try_get("matter_id")?,
            matter_name: row.try_get("matter_name")?,
            department: row
                .try_get::<Option<String>, _>("department")?
                .unwrap_or_else(|| "Legal".to_string()),
            practice_area,
            invoice_date: row.try_get("invoice_date")?,
            amount: row.try_get::<Decimal, _>("amount")?,
            currency: row
                .try_get::<Option<String>, _>("currency")?
                .unwrap_or_else(|| "USD".to_string()),
            expense_category: row
                .try_get::<Option<String>, _>("expense_category")?
                .unwrap_or_else(|| "Legal Services".to_string()),
            description: row
                .try_get::<Option<String>, _>("description")?
                .unwrap_or_default(),
            billing_period_start: row.try_get("billing_period_start")?,
            billing_period_end: row.try_get("billing_period_end")?,
            status: row
                .try_get::<Option<String>, _>("status")?
                .unwrap_or_else(|| "approved".to_string()),
            budget_code: row.try_get("budget_code")?,
            source_system: Some(self.name.clone()),
            metadata: None,
        })
    }

    async fn fetch_vendors(&self, pool: &PgPool) -> Result<Vec<VendorRef>, SpendError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT DISTINCT vendor_name FROM ");
        query.push(&self.table);
        query.push(" ORDER BY vendor_name");

        let rows = query
            .build()
            .fetch_all(pool)
            .await
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?;

        let mut vendors = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("vendor_name")
                .map_err(|e| SpendError::data(e.to_string()))?;
            vendors.push(VendorRef {
                id: vendor_id(&name),
                name,
                kind: VendorType::LawFirm,
                source: self.name.clone(),
            });
        }
        Ok(vendors)
    }
}

#[async_trait]
impl SpendSource for DbSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Database
    }

    async fn spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        let Some(pool) = &self.pool else {
            debug!(source = %self.name, "no executing backend for this driver family");
            return Ok(vec![]);
        };
        match self.fetch_records(pool, start, end, filters).await {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(source = %self.name, error = %e, "query failed; returning empty");
                Ok(vec![])
            }
        }
    }

    async fn vendors(&self) -> Result<Vec<VendorRef>, SpendError> {
        let Some(pool) = &self.pool else {
            return Ok(vec![]);
        };
        match self.fetch_vendors(pool).await {
            Ok(vendors) => Ok(vendors),
            Err(e) => {
                warn!(source = %self.name, error = %e, "vendor query failed; returning empty");
                Ok(vec![])
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match &self.pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }

    async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
