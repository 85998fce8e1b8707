//! `lexwatch check` — run one poll cycle over the catalog.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::monitor::{CheckOptions, Monitor};

/// Run the check command.
pub async fn run(
    config: &Config,
    law: Option<String>,
    hours: u32,
    include_recent: bool,
    json: bool,
) -> Result<()> {
    let catalog = Catalog::open(&config.db_path)?;
    let monitor = Monitor::new(catalog, config);
    let opts = CheckOptions {
        skip_recent: !include_recent,
        hours,
        law,
    };

    let report = monitor.run(&opts).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        return Ok(());
    }

    let stats = &report.stats;
    println!(
        "checked {} of {} documents in {:.1}s ({} skipped as recent)",
        stats.checked,
        stats.considered,
        report.duration.as_secs_f64(),
        stats.skipped_recent,
    );
    println!("  {}", stats.efficiency_summary());

    if report.changes.is_empty() {
        println!("  no revision changes");
    } else {
        for change in &report.changes {
            println!(
                "  CHANGED  {}  {} -> {}  ({})",
                change.law, change.old_date, change.new_date, change.name
            );
        }
    }

    if let Some(results) = &report.results {
        for r in results {
            println!(
                "  {}  method={} bytes={} offset={} error={}",
                r.law,
                r.method,
                r.bytes,
                r.offset.map_or("-".to_string(), |o| o.to_string()),
                r.error.as_deref().unwrap_or("-"),
            );
        }
    }

    if stats.errors.count > 0 {
        println!("  {} document(s) failed; see the log for reasons", stats.errors.count);
    }

    Ok(())
}
