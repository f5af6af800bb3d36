//! Flat-file connector for CSV and Excel spend exports.
//!
//! Parsed rows are cached keyed by the file's last-modified timestamp, so
//! repeated queries avoid re-parsing until the file changes on disk. A
//! missing or unreadable file yields an empty data set and a failing probe,
//! never an error, and a bad row is logged and skipped without aborting the
//! rest of the import.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use legalspend_core::{
    analytics, SourceConfig, SourceKind, SpendError, SpendFilters, SpendRecord, SpendSource,
    VendorRef,
};

mod row;

use row::RawRow;

/// Supported flat-file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    fn from_param(value: &str) -> Result<Self, SpendError> {
        match value {
            "csv" => Ok(Self::Csv),
            "excel" => Ok(Self::Excel),
            other => Err(SpendError::config(format!(
                "unsupported file type: {other}"
            ))),
        }
    }

    /// Provenance tag stamped on records, e.g. "File-csv".
    const fn source_tag(self) -> &'static str {
        match self {
            Self::Csv => "File-csv",
            Self::Excel => "File-excel",
        }
    }
}

#[derive(Debug)]
struct CachedRows {
    modified: SystemTime,
    records: Vec<SpendRecord>,
}

/// Connector for CSV and Excel spend exports.
#[derive(Debug)]
pub struct FileSource {
    name: String,
    path: PathBuf,
    format: FileFormat,
    delimiter: u8,
    sheet_name: String,
    cache: RwLock<Option<CachedRows>>,
}

impl FileSource {
    /// Build a connector from configuration. Requires `file_path` and
    /// `file_type` (`csv` or `excel`); `delimiter` defaults to a comma and
    /// `sheet_name` to "Sheet1". Content is read as UTF-8; fields that are
    /// not valid UTF-8 are skipped with a warning.
    ///
    /// # Errors
    /// Returns a configuration error for a missing parameter or an unknown
    /// file type. A nonexistent path is not an error here: the probe reports
    /// it and queries return empty.
    pub fn new(config: &SourceConfig) -> Result<Self, SpendError> {
        let params = &config.connection_params;
        let path = params
            .str("file_path")
            .ok_or_else(|| SpendError::config(format!("{}: missing file_path", config.name)))?;
        let format = params
            .str("file_type")
            .ok_or_else(|| SpendError::config(format!("{}: missing file_type", config.name)))
            .and_then(FileFormat::from_param)?;
        let delimiter = params
            .str_or("delimiter", ",")
            .bytes()
            .next()
            .unwrap_or(b',');
        let sheet_name = params.str_or("sheet_name", "Sheet1").to_string();

        Ok(Self {
            name: config.name.clone(),
            path: PathBuf::from(path),
            format,
            delimiter,
            sheet_name,
            cache: RwLock::new(None),
        })
    }

    /// Parsed records, reloaded only when the file's mtime changed.
    async fn load(&self) -> Result<Vec<SpendRecord>, SpendError> {
        let modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?;

        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.modified == modified {
                return Ok(cached.records.clone());
            }
        }

        let records = match self.format {
            FileFormat::Csv => self.parse_csv().await?,
            FileFormat::Excel => self.parse_excel().await?,
        };
        debug!(source = %self.name, count = records.len(), "parsed file");

        *self.cache.write().await = Some(CachedRows {
            modified,
            records: records.clone(),
        });
        Ok(records)
    }

    async fn parse_csv(&self) -> Result<Vec<SpendRecord>, SpendError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SpendError::source(self.name.clone(), e.to_string()))?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| SpendError::data(format!("{}: headers: {e}", self.name)))?
            .iter()
            .map(str::to_string)
            .collect();

        let tag = self.format.source_tag();
        let mut records = Vec::new();
        for entry in reader.records() {
            match entry {
                Ok(fields) => {
                    let cells: Vec<String> = fields.iter().map(str::to_string).collect();
                    match RawRow::new(&headers, cells).into_record(tag) {
                        Ok(record) => records.push(record),
                        Err(e) => warn!(source = %self.name, error = %e, "skipping row"),
                    }
                }
                Err(e) => warn!(source = %self.name, error = %e, "skipping unreadable row"),
            }
        }
        Ok(records)
    }

    async fn parse_excel(&self) -> Result<Vec<SpendRecord>, SpendError> {
        let path = self.path.clone();
        let sheet = self.sheet_name.clone();
        let name = self.name.clone();
        let tag = self.format.source_tag();

        // calamine reads synchronously; keep the workbook parse off the
        // async executor.
        tokio::task::spawn_blocking(move || {
            let mut workbook = open_workbook_auto(&path)
                .map_err(|e| SpendError::source(name.clone(), e.to_string()))?;
            let range = workbook
                .worksheet_range(&sheet)
                .map_err(|e| SpendError::source(name.clone(), e.to_string()))?;

            let mut rows = range.rows();
            let headers: Vec<String> = rows
                .next()
                .map(|cells| cells.iter().map(cell_to_string).collect())
                .unwrap_or_default();

            let mut records = Vec::new();
            for cells in rows {
                let cells: Vec<String> = cells.iter().map(cell_to_string).collect();
                match RawRow::new(&headers, cells).into_record(tag) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!(source = %name, error = %e, "skipping row"),
                }
            }
            Ok(records)
        })
        .await
        .map_err(|e| SpendError::source(self.name.clone(), format!("parse task: {e}")))?
    }
}

/// Flatten a spreadsheet cell to the textual form the row normalizer
/// expects; dates become ISO strings.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

#[async_trait]
impl SpendSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    async fn spend_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filters: Option<&SpendFilters>,
    ) -> Result<Vec<SpendRecord>, SpendError> {
        let records = match self.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(source = %self.name, error = %e, "file load failed; returning empty");
                return Ok(vec![]);
            }
        };

        Ok(records
            .into_iter()
            .filter(|r| r.invoice_date >= start && r.invoice_date <= end)
            .filter(|r| filters.is_none_or(|f| analytics::matches_filters(r, f)))
            .collect())
    }

    async fn vendors(&self) -> Result<Vec<VendorRef>, SpendError> {
        let records = match self.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(source = %self.name, error = %e, "file load failed; returning empty");
                return Ok(vec![]);
            }
        };

        let mut seen = HashSet::new();
        let mut vendors: Vec<VendorRef> = records
            .iter()
            .filter(|r| seen.insert(r.vendor_name.clone()))
            .map(|r| {
                VendorRef::new(
                    r.vendor_name.clone(),
                    r.vendor_type,
                    self.format.source_tag(),
                )
            })
            .collect();
        vendors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vendors)
    }

    async fn test_connection(&self) -> bool {
        tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
