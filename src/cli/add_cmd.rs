//! `lexwatch add` — register a document for monitoring.

use anyhow::{Context, Result};
use url::Url;

use crate::catalog::Catalog;
use crate::config::Config;

/// Run the add command.
pub async fn run(config: &Config, slug: &str, source_url: &str, name: &str) -> Result<()> {
    let parsed = Url::parse(source_url)
        .with_context(|| format!("invalid source URL: {source_url}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("source URL must be http(s), got '{}'", parsed.scheme());
    }

    let catalog = Catalog::open(&config.db_path)?;
    catalog.add(slug, name, source_url)?;
    println!("registered '{slug}' ({name})");
    println!("  {source_url}");
    Ok(())
}
