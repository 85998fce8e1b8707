//! `lexwatch list` — show monitored documents and their cached state.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::marker::date::format_dmy;
use crate::monitor::report::human_bytes;

/// Run the list command.
pub async fn run(config: &Config, json: bool) -> Result<()> {
    let catalog = Catalog::open(&config.db_path)?;
    let laws = catalog.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&laws)?);
        return Ok(());
    }

    if laws.is_empty() {
        println!("no monitored documents; register one with 'lexwatch add'");
        return Ok(());
    }

    for law in &laws {
        let revision = law
            .last_update_boe
            .map_or("never resolved".to_string(), format_dmy);
        let checked = law
            .last_checked
            .map_or("never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!("{}  {}", law.slug, law.name);
        println!("    url:       {}", law.source_url);
        println!("    revision:  {revision}  (last checked {checked})");
        if let (Some(offset), Some(len)) = (law.date_byte_offset, law.boe_content_length) {
            println!(
                "    cache:     marker at byte {offset} of {} total",
                human_bytes(len)
            );
        }
        if let Some(at) = law.change_detected_at {
            println!("    change:    detected {}", at.format("%Y-%m-%d %H:%M"));
        }
    }

    Ok(())
}
