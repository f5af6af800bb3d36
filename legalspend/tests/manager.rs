use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::NamedTempFile;

use legalspend::{
    ConnectionStatus, SourceConfig, SourceKind, SpendFilters, SpendManager, TrendDirection,
};
use legalspend_core::ConnectionParams;
use legalspend_mock::{sample_record, MockSource};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn manager_with(sources: Vec<Arc<MockSource>>) -> SpendManager {
    let mut manager = SpendManager::builder().build().unwrap();
    for source in sources {
        manager.add_source(source);
    }
    manager
}

#[tokio::test]
async fn fan_out_isolates_a_failing_source() {
    let healthy_a = Arc::new(MockSource::new("alpha").with_records(vec![
        sample_record("Vendor A", "2024-01-05", "100.00"),
        sample_record("Vendor B", "2024-01-06", "200.00"),
    ]));
    let healthy_b = Arc::new(
        MockSource::new("beta")
            .with_records(vec![sample_record("Vendor C", "2024-01-07", "300.00")]),
    );
    let broken = Arc::new(MockSource::new("gamma").failing());

    let manager = manager_with(vec![healthy_a, healthy_b, broken]);
    let records = manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
        .await;

    assert_eq!(records.len(), 3, "union of the two healthy sources");
    let total: Decimal = records.iter().map(|r| r.amount).sum();
    assert_eq!(total, dec("600.00"));
}

#[tokio::test]
async fn named_source_queries_only_that_source() {
    let alpha = Arc::new(
        MockSource::new("alpha")
            .with_records(vec![sample_record("Vendor A", "2024-01-05", "100.00")]),
    );
    let beta = Arc::new(
        MockSource::new("beta")
            .with_records(vec![sample_record("Vendor B", "2024-01-06", "200.00")]),
    );

    let manager = manager_with(vec![alpha.clone(), beta.clone()]);
    let records = manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, Some("alpha"))
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vendor_name, "Vendor A");
    assert_eq!(alpha.spend_calls(), 1);
    assert_eq!(beta.spend_calls(), 0);

    let unknown = manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, Some("nope"))
        .await;
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn repeated_queries_hit_the_cache() {
    let source = Arc::new(
        MockSource::new("alpha")
            .with_records(vec![sample_record("Vendor A", "2024-01-05", "100.00")]),
    );
    let manager = manager_with(vec![source.clone()]);

    for _ in 0..3 {
        let records = manager
            .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
            .await;
        assert_eq!(records.len(), 1);
    }
    assert_eq!(source.spend_calls(), 1, "cache must absorb repeats");

    // Different arguments form a different cache key.
    manager
        .get_spend_data(d("2024-02-01"), d("2024-02-29"), None, None)
        .await;
    assert_eq!(source.spend_calls(), 2);

    manager.invalidate_cache(Some("spend_data")).await;
    manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
        .await;
    assert_eq!(source.spend_calls(), 3, "invalidation forces a refetch");
}

#[tokio::test]
async fn filters_are_part_of_the_cache_key() {
    let source = Arc::new(MockSource::new("alpha").with_records(vec![
        sample_record("Vendor A", "2024-01-05", "100.00"),
        sample_record("Vendor B", "2024-01-06", "200.00"),
    ]));
    let manager = manager_with(vec![source.clone()]);

    let all = manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
        .await;
    assert_eq!(all.len(), 2);

    let filters = SpendFilters::default().vendor("Vendor A");
    let filtered = manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), Some(&filters), None)
        .await;
    assert_eq!(filtered.len(), 1);
    assert_eq!(source.spend_calls(), 2);
}

#[tokio::test]
async fn vendors_merge_first_seen_wins_and_sort_by_name() {
    // "Vendor Shared" appears in both sources and must keep the first
    // source's entry because ids hash the name alone.
    let alpha = Arc::new(MockSource::new("alpha").with_records(vec![
        sample_record("Vendor Shared", "2024-01-05", "100.00"),
        sample_record("Zeta Legal", "2024-01-06", "50.00"),
    ]));
    let beta = Arc::new(MockSource::new("beta").with_records(vec![
        sample_record("Vendor Shared", "2024-02-05", "900.00"),
        sample_record("Alpha Counsel", "2024-02-06", "70.00"),
    ]));

    let manager = manager_with(vec![alpha, beta]);
    let vendors = manager.get_all_vendors().await;

    assert_eq!(vendors.len(), 3);
    let names: Vec<&str> = vendors.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha Counsel", "Vendor Shared", "Zeta Legal"]);
    let shared = vendors.iter().find(|v| v.name == "Vendor Shared").unwrap();
    assert_eq!(shared.source, "alpha", "first-seen entry wins on id collision");
}

#[tokio::test]
async fn vendor_fan_out_survives_a_failing_source() {
    let healthy = Arc::new(
        MockSource::new("alpha")
            .with_records(vec![sample_record("Vendor A", "2024-01-05", "100.00")]),
    );
    let broken = Arc::new(MockSource::new("beta").failing());

    let manager = manager_with(vec![healthy, broken]);
    let vendors = manager.get_all_vendors().await;
    assert_eq!(vendors.len(), 1);
}

#[tokio::test]
async fn status_reports_live_probes() {
    let up = Arc::new(MockSource::new("alpha"));
    let down = Arc::new(MockSource::new("beta").connected(false));

    let manager = manager_with(vec![up, down]);
    let statuses = manager.get_sources_status().await;

    assert_eq!(statuses.len(), 2);
    let alpha = statuses.iter().find(|s| s.name == "alpha").unwrap();
    let beta = statuses.iter().find(|s| s.name == "beta").unwrap();
    assert_eq!(alpha.status, ConnectionStatus::Active);
    assert_eq!(beta.status, ConnectionStatus::Disconnected);
    assert!(alpha.enabled && beta.enabled);
}

#[tokio::test]
async fn search_spans_sources_and_applies_bounds() {
    let mut matching = sample_record("Smith & Associates", "2024-01-05", "15000.00");
    matching.description = "Deposition support".to_string();
    let small = sample_record("Smith Reporting", "2024-01-06", "50.00");
    let unrelated = sample_record("Jones LLP", "2024-01-07", "20000.00");

    let alpha = Arc::new(MockSource::new("alpha").with_records(vec![matching, small]));
    let beta = Arc::new(MockSource::new("beta").with_records(vec![unrelated]));
    let manager = manager_with(vec![alpha, beta]);

    let results = manager
        .search_transactions(
            "smith",
            d("2024-01-01"),
            d("2024-01-31"),
            Some(dec("10000.0")),
            None,
            5,
        )
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].vendor_name, "Smith & Associates");

    let none = manager
        .search_transactions("nonexistent", d("2024-01-01"), d("2024-01-31"), None, None, 5)
        .await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn department_spend_and_recommendations() {
    let mut legal = sample_record("Vendor A", "2024-01-05", "900.00");
    legal.department = "Legal".to_string();
    let mut compliance = sample_record("Vendor B", "2024-01-06", "100.00");
    compliance.department = "Compliance".to_string();

    let manager = manager_with(vec![Arc::new(
        MockSource::new("alpha").with_records(vec![legal, compliance]),
    )]);

    let dept = manager
        .get_department_spend("Legal", d("2024-01-01"), d("2024-01-31"))
        .await;
    assert_eq!(dept.len(), 1);

    let actual: Decimal = dept.iter().map(|r| r.amount).sum();
    let variance = manager.budget_variance(actual, dec("500.00"));
    assert_eq!(variance, 80.0);

    let recommendations = manager.generate_budget_recommendations(variance, &dept);
    assert!(recommendations[0].contains("over budget"));
    // A single vendor carries 100% of this set.
    assert!(recommendations.iter().any(|r| r.contains("Vendor A")));
}

#[tokio::test]
async fn trend_and_monthly_breakdown_flow_through() {
    let manager = manager_with(vec![]);
    let records = vec![
        sample_record("Vendor A", "2024-01-10", "1000.00"),
        sample_record("Vendor A", "2024-02-15", "1200.00"),
    ];

    let breakdown = manager.get_monthly_breakdown(&records);
    assert_eq!(breakdown["2024-01"], dec("1000.00"));
    assert_eq!(breakdown["2024-02"], dec("1200.00"));

    let trend = manager.calculate_spend_trend(&records);
    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert_eq!(trend.change_percentage, 20.0);
}

#[tokio::test]
async fn overview_flags_vendor_concentration() {
    let manager = manager_with(vec![Arc::new(MockSource::new("alpha").with_records(vec![
        sample_record("Dominant LLP", "2024-01-05", "950.00"),
        sample_record("Vendor B", "2024-01-06", "50.00"),
    ]))]);

    let overview = manager
        .get_spend_overview(d("2024-01-01"), d("2024-01-31"))
        .await;

    assert_eq!(overview.total_spend, dec("1000.00"));
    assert_eq!(overview.transaction_count, 2);
    assert_eq!(overview.active_vendors, 2);
    assert!(overview.alerts.iter().any(|a| a.contains("Dominant LLP")));
    assert_eq!(overview.top_categories[0].name, "Legal Services");
}

#[tokio::test]
async fn initialize_retains_only_probe_passing_sources() {
    let mut csv = NamedTempFile::new().unwrap();
    writeln!(csv, "invoice_id,vendor_name,invoice_date,amount").unwrap();
    writeln!(csv, "INV-001,Vendor A,2024-01-05,100.00").unwrap();
    csv.flush().unwrap();

    let mut file_params = ConnectionParams::default();
    file_params.set("file_type", "csv");
    file_params.set("file_path", csv.path().to_str().unwrap());

    let mut placeholder_params = ConnectionParams::default();
    placeholder_params.set("api_key", "k");

    let mut disabled_params = ConnectionParams::default();
    disabled_params.set("file_type", "csv");
    disabled_params.set("file_path", "/nonexistent.csv");

    let configs = vec![
        SourceConfig {
            name: "csv_import".to_string(),
            kind: SourceKind::File,
            enabled: true,
            connection_params: file_params,
        },
        // Placeholder integration: constructs fine, probe reports false.
        SourceConfig {
            name: "brightflag".to_string(),
            kind: SourceKind::Api,
            enabled: true,
            connection_params: placeholder_params,
        },
        // Unknown API integration: construction fails, loop continues.
        SourceConfig {
            name: "mystery_api".to_string(),
            kind: SourceKind::Api,
            enabled: true,
            connection_params: ConnectionParams::default(),
        },
        // Disabled configurations are skipped outright.
        SourceConfig {
            name: "disabled_csv".to_string(),
            kind: SourceKind::File,
            enabled: false,
            connection_params: disabled_params,
        },
    ];

    let mut manager = SpendManager::builder().build().unwrap();
    manager.initialize_sources(&configs).await;

    assert_eq!(manager.active_sources(), vec!["csv_import".to_string()]);

    let records = manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
        .await;
    assert_eq!(records.len(), 1);

    manager.cleanup().await;
}

#[tokio::test]
async fn cleanup_is_safe_on_an_empty_manager() {
    let manager = SpendManager::builder().build().unwrap();
    manager.cleanup().await;
}

#[tokio::test]
async fn short_cache_ttl_expires() {
    let source = Arc::new(
        MockSource::new("alpha")
            .with_records(vec![sample_record("Vendor A", "2024-01-05", "100.00")]),
    );
    let mut manager = SpendManager::builder()
        .cache_ttl(Duration::from_millis(30))
        .build()
        .unwrap();
    manager.add_source(source.clone());

    manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
        .await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    manager
        .get_spend_data(d("2024-01-01"), d("2024-01-31"), None, None)
        .await;
    assert_eq!(source.spend_calls(), 2);
}
