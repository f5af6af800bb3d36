//! Aggregate a CSV export and print a quarterly summary.
//!
//! ```sh
//! cargo run --example csv_quickstart -- /path/to/spend.csv
//! ```

use chrono::NaiveDate;
use legalspend::{ConnectionParams, SourceConfig, SourceKind, SpendManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "spend.csv".to_string());

    let mut params = ConnectionParams::default();
    params.set("file_type", "csv");
    params.set("file_path", path);
    let config = SourceConfig {
        name: "csv_import".to_string(),
        kind: SourceKind::File,
        enabled: true,
        connection_params: params,
    };

    let mut manager = SpendManager::builder().build()?;
    manager.initialize_sources(&[config]).await;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date");
    let records = manager.get_spend_data(start, end, None, None).await;
    let summary = manager.generate_summary(&records, start, end);

    println!(
        "{} records, {} {} total",
        summary.record_count, summary.total_amount, summary.currency
    );
    for vendor in &summary.top_vendors {
        println!("  {:<40} {}", vendor.name, vendor.amount);
    }

    let trend = manager.calculate_spend_trend(&records);
    println!("trend: {} ({:+.1}%)", trend.direction, trend.change_percentage);

    manager.cleanup().await;
    Ok(())
}
