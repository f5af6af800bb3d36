use std::io::Write;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::NamedTempFile;

use legalspend_core::{
    analytics, ConnectionParams, SourceConfig, SourceKind, SpendError, SpendFilters, SpendSource,
};
use legalspend_file::FileSource;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn csv_config(name: &str, path: &str) -> SourceConfig {
    let mut params = ConnectionParams::default();
    params.set("file_type", "csv");
    params.set("file_path", path);
    SourceConfig {
        name: name.to_string(),
        kind: SourceKind::File,
        enabled: true,
        connection_params: params,
    }
}

fn write_sample_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "invoice_id,vendor_name,matter_name,department,practice_area,invoice_date,amount,currency,description"
    )
    .unwrap();
    writeln!(
        file,
        "INV-001,Vendor A,Acme v. Initech,Legal,Litigation,2024-01-05,1000.00,USD,Discovery support"
    )
    .unwrap();
    writeln!(
        file,
        "INV-002,Vendor B,,Compliance,Corporate,2024-02-10,500.00,USD,Contract review"
    )
    .unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn csv_end_to_end_matches_summary() {
    let file = write_sample_csv();
    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();

    let records = source
        .spend_data(d("2024-01-01"), d("2024-02-28"), None)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.source_system.as_deref() == Some("File-csv")));
    assert_eq!(records[0].amount, Decimal::from_str("1000.00").unwrap());

    let summary = analytics::summarize(&records, d("2024-01-01"), d("2024-02-28"));
    assert_eq!(summary.total_amount, Decimal::from_str("1500.00").unwrap());
    assert_eq!(summary.record_count, 2);
}

#[tokio::test]
async fn date_range_narrows_results() {
    let file = write_sample_csv();
    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();

    let january = source
        .spend_data(d("2024-01-01"), d("2024-01-31"), None)
        .await
        .unwrap();
    assert_eq!(january.len(), 1);
    assert_eq!(january[0].vendor_name, "Vendor A");
}

#[tokio::test]
async fn filters_apply_as_substrings() {
    let file = write_sample_csv();
    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();

    let filters = SpendFilters::default().vendor("vendor a");
    let records = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), Some(&filters))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vendor_name, "Vendor A");
}

#[tokio::test]
async fn bad_rows_are_skipped_not_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invoice_id,vendor_name,invoice_date,amount").unwrap();
    writeln!(file, "INV-001,Vendor A,2024-01-05,100.00").unwrap();
    writeln!(file, "INV-002,Vendor B,not-a-date,200.00").unwrap();
    writeln!(file, "INV-003,Vendor C,2024-01-07,not-a-number").unwrap();
    file.flush().unwrap();

    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();
    let records = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vendor_name, "Vendor A");
}

#[tokio::test]
async fn custom_delimiter_is_honored() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invoice_id;vendor_name;invoice_date;amount").unwrap();
    writeln!(file, "INV-001;Vendor A;2024-01-05;100.00").unwrap();
    file.flush().unwrap();

    let mut config = csv_config("test_csv", file.path().to_str().unwrap());
    config.connection_params.set("delimiter", ";");
    let source = FileSource::new(&config).unwrap();

    let records = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn metadata_column_is_parsed_per_row() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invoice_id,vendor_name,invoice_date,amount,metadata").unwrap();
    writeln!(
        file,
        r#"INV-001,Vendor A,2024-01-05,100.00,"{{""po_number"": ""PO-9""}}""#
    )
    .unwrap();
    file.flush().unwrap();

    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();
    let records = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), None)
        .await
        .unwrap();
    assert_eq!(records[0].metadata.as_ref().unwrap()["po_number"], json!("PO-9"));
}

#[tokio::test]
async fn vendors_have_stable_ids_across_calls() {
    let file = write_sample_csv();
    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();

    let first = source.vendors().await.unwrap();
    let second = source.vendors().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second, "vendor ids must be deterministic");
}

#[tokio::test]
async fn missing_file_probes_false_and_reads_empty() {
    let source =
        FileSource::new(&csv_config("missing", "/nonexistent/spend.csv")).unwrap();

    assert!(!source.test_connection().await);
    let records = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), None)
        .await
        .unwrap();
    assert!(records.is_empty());
    assert!(source.vendors().await.unwrap().is_empty());
}

#[test]
fn unknown_file_type_is_a_config_error() {
    let mut params = ConnectionParams::default();
    params.set("file_type", "parquet");
    params.set("file_path", "/tmp/spend.parquet");
    let config = SourceConfig {
        name: "bad".to_string(),
        kind: SourceKind::File,
        enabled: true,
        connection_params: params,
    };
    let err = FileSource::new(&config).unwrap_err();
    assert!(matches!(err, SpendError::Config(_)));
    assert!(err.to_string().contains("parquet"));
}

#[tokio::test]
async fn parse_cache_serves_repeat_queries() {
    let file = write_sample_csv();
    let source = FileSource::new(&csv_config("test_csv", file.path().to_str().unwrap())).unwrap();

    let first = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), None)
        .await
        .unwrap();
    let second = source
        .spend_data(d("2024-01-01"), d("2024-12-31"), None)
        .await
        .unwrap();
    assert_eq!(first, second);
}
