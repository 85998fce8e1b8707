// Copyright 2026 Lexwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP trigger for scheduled and ad-hoc check runs.
//!
//! Designed to sit behind a cron-driven `curl` or an uptime service: one
//! GET starts a full check cycle and the response carries the whole run
//! report. Errors never surface as HTTP failures — the body's `success`
//! flag and `error` field carry them, so a scheduler only has to parse
//! one shape.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::monitor::{CheckOptions, Monitor};

/// Shared state behind the REST handlers.
///
/// The monitor owns a SQLite connection, so runs are serialized behind an
/// async mutex — which also matches the engine's one-run-at-a-time model.
pub struct AppState {
    pub monitor: Mutex<Monitor>,
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/check", get(handle_check))
        .route("/api/v1/laws", get(handle_laws))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP trigger on the given port.
pub async fn start(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("trigger listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Query parameters of the check trigger.
#[derive(Debug, Deserialize, Default)]
struct CheckParams {
    #[serde(rename = "skipRecent")]
    skip_recent: Option<bool>,
    law: Option<String>,
    hours: Option<u32>,
}

impl CheckParams {
    fn into_options(self) -> CheckOptions {
        let defaults = CheckOptions::default();
        CheckOptions {
            skip_recent: self.skip_recent.unwrap_or(defaults.skip_recent),
            hours: self.hours.unwrap_or(defaults.hours),
            law: self.law,
        }
    }
}

/// `GET /api/v1/check?skipRecent=<bool>&law=<slug>&hours=<n>`
async fn handle_check(
    Query(params): Query<CheckParams>,
    State(state): State<Arc<AppState>>,
) -> Json<Value> {
    let opts = params.into_options();
    let monitor = state.monitor.lock().await;
    match monitor.run(&opts).await {
        Ok(report) => Json(report.to_json()),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("{e:#}"),
        })),
    }
}

/// `GET /api/v1/laws` — the catalog and its cached probing state.
async fn handle_laws(State(state): State<Arc<AppState>>) -> Json<Value> {
    let monitor = state.monitor.lock().await;
    match monitor.documents() {
        Ok(laws) => Json(serde_json::json!({ "success": true, "laws": laws })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("{e:#}"),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_params_defaults() {
        let opts = CheckParams::default().into_options();
        assert!(opts.skip_recent);
        assert_eq!(opts.hours, 12);
        assert!(opts.law.is_none());
    }

    #[test]
    fn test_check_params_override() {
        let params = CheckParams {
            skip_recent: Some(false),
            law: Some("cc".into()),
            hours: Some(48),
        };
        let opts = params.into_options();
        assert!(!opts.skip_recent);
        assert_eq!(opts.hours, 48);
        assert_eq!(opts.law.as_deref(), Some("cc"));
    }
}
