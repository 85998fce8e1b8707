//! `lexwatch serve` — start the HTTP trigger.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::monitor::Monitor;
use crate::rest::{self, AppState};

/// Run the serve command.
pub async fn run(config: &Config, port: Option<u16>) -> Result<()> {
    let catalog = Catalog::open(&config.db_path)?;
    let monitor = Monitor::new(catalog, config);
    let state = Arc::new(AppState {
        monitor: Mutex::new(monitor),
    });

    rest::start(port.unwrap_or(config.http_port), state).await
}
