//! Full run-cycle behavior: caching across runs, change classification,
//! and the recency filter.

mod common;

use common::{make_doc, serve_doc, test_config, MARKER_PREFIX};
use tempfile::TempDir;

use lexwatch::catalog::Catalog;
use lexwatch::monitor::report::PollMethod;
use lexwatch::monitor::{CheckOptions, Monitor};

fn eager() -> CheckOptions {
    CheckOptions {
        skip_recent: false,
        hours: 12,
        law: None,
    }
}

#[tokio::test]
async fn test_repeated_runs_converge_to_zero_bytes() {
    let doc = make_doc(200_000, 60_000, "05/03/2024");
    let (_server, url, _handle) = serve_doc(doc).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("catalog.db"));
    let catalog = Catalog::open(&config.db_path).unwrap();
    catalog.add("cc", "Código Civil", &url).unwrap();
    let monitor = Monitor::new(catalog, &config);

    // Run 1 pays for discovery: the 50 kB prefix misses, the 150 kB hits.
    let first = monitor.run(&eager()).await.unwrap();
    assert_eq!(first.stats.partial_150k.count, 1);
    assert!(first.stats.total_bytes > 0);
    assert!(first.changes.is_empty(), "first resolution is never a change");

    // Every later run against unchanged content is free beyond the HEAD.
    let second = monitor.run(&eager()).await.unwrap();
    assert_eq!(second.stats.head_unchanged.count, 1);
    assert_eq!(second.stats.total_bytes, 0);
    assert!(second.changes.is_empty());

    let third = monitor.run(&eager()).await.unwrap();
    assert_eq!(third.stats.head_unchanged.count, 1);
    assert_eq!(third.stats.total_bytes, 0);
}

#[tokio::test]
async fn test_revision_change_detected_and_flagged() {
    let doc = make_doc(200_000, 60_000, "05/03/2024");
    let (_server, url, handle) = serve_doc(doc).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("catalog.db"));
    let catalog = Catalog::open(&config.db_path).unwrap();
    catalog.add("cc", "Código Civil", &url).unwrap();
    let monitor = Monitor::new(catalog, &config);

    monitor.run(&eager()).await.unwrap();

    // The law is amended: new revision date at the same anchor, and the
    // consolidated text grows.
    *handle.lock().unwrap() = make_doc(205_000, 60_000, "01/06/2024");

    let report = monitor.run(&eager()).await.unwrap();
    // The size probe notices the new length, the cached anchor still
    // holds, so the change costs one narrow window.
    assert_eq!(report.stats.cached_offset.count, 1);
    assert_eq!(report.changes.len(), 1);
    let change = &report.changes[0];
    assert_eq!(change.law, "cc");
    assert_eq!(change.old_date, "05/03/2024");
    assert_eq!(change.new_date, "01/06/2024");

    let catalog = Catalog::open(&config.db_path).unwrap();
    let law = catalog.find("cc").unwrap().unwrap();
    assert_eq!(law.change_status.as_deref(), Some("changed"));
    assert!(law.change_detected_at.is_some());
    assert_eq!(law.boe_content_length, Some(205_000));
    assert_eq!(
        law.last_update_boe.map(|d| d.format("%d/%m/%Y").to_string()).as_deref(),
        Some("01/06/2024")
    );

    // A further unchanged run leaves the flag alone.
    let quiet = monitor.run(&eager()).await.unwrap();
    assert!(quiet.changes.is_empty());
    let law = Catalog::open(&config.db_path)
        .unwrap()
        .find("cc")
        .unwrap()
        .unwrap();
    assert_eq!(law.change_status.as_deref(), Some("changed"));
}

#[tokio::test]
async fn test_recency_filter_excludes_without_network() {
    let doc = make_doc(80_000, 30_000, "05/03/2024");
    let (_server, url, _handle) = serve_doc(doc).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("catalog.db"));
    let catalog = Catalog::open(&config.db_path).unwrap();
    catalog.add("cc", "Código Civil", &url).unwrap();
    let monitor = Monitor::new(catalog, &config);

    monitor.run(&eager()).await.unwrap();

    // Default options skip anything checked in the last 12 hours.
    let report = monitor.run(&CheckOptions::default()).await.unwrap();
    assert_eq!(report.stats.considered, 1);
    assert_eq!(report.stats.skipped_recent, 1);
    assert_eq!(report.stats.checked, 0);
    assert_eq!(report.stats.total_bytes, 0);
}

#[tokio::test]
async fn test_tier_equivalence_on_fixed_content() {
    // The same fixed document must yield the same date whether it is
    // resolved from a prefix or from the full body.
    let date = "09/12/2019";
    let early = make_doc(120_000, 20_000, date);
    let late = make_doc(400_000, 380_000, date);
    let (_s1, early_url, _h1) = serve_doc(early).await;
    let (_s2, late_url, _h2) = serve_doc(late).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("catalog.db"));
    let catalog = Catalog::open(&config.db_path).unwrap();
    catalog.add("early", "Marcador temprano", &early_url).unwrap();
    catalog.add("late", "Marcador tardío", &late_url).unwrap();
    let monitor = Monitor::new(catalog, &config);

    monitor.run(&eager()).await.unwrap();

    let catalog = Catalog::open(&config.db_path).unwrap();
    let a = catalog.find("early").unwrap().unwrap();
    let b = catalog.find("late").unwrap().unwrap();
    assert_eq!(a.last_update_boe, b.last_update_boe);
    assert!(a.last_update_boe.is_some());
}

#[tokio::test]
async fn test_entity_encoded_marker_round_trip() {
    // Make sure the fixture really is entity-encoded the way the live
    // pages are; the decoded phrase must not appear in the raw bytes.
    assert!(MARKER_PREFIX.contains("&Uacute;"));
    let doc = make_doc(60_000, 9_000, "17/07/2023");
    let raw = String::from_utf8_lossy(&doc);
    assert!(!raw.contains("Última"));

    let (_server, url, _handle) = serve_doc(doc).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("catalog.db"));
    let catalog = Catalog::open(&config.db_path).unwrap();
    catalog.add("lo", "Ley Orgánica", &url).unwrap();
    let monitor = Monitor::new(catalog, &config);

    let report = monitor
        .run(&CheckOptions {
            skip_recent: false,
            hours: 12,
            law: Some("lo".into()),
        })
        .await
        .unwrap();
    let results = report.results.unwrap();
    assert_eq!(results[0].method, PollMethod::Partial50k);
    assert_eq!(
        results[0].date.map(|d| d.format("%d/%m/%Y").to_string()).as_deref(),
        Some("17/07/2023")
    );
}
