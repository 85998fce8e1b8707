// Copyright 2026 Lexwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration from environment variables.

use std::path::PathBuf;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_COURTESY_DELAY_MS: u64 = 1_500;
const DEFAULT_HTTP_PORT: u16 = 7700;

/// Runtime knobs, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog database location (`LEXWATCH_DB`).
    pub db_path: PathBuf,
    /// Per-request timeout in milliseconds (`LEXWATCH_TIMEOUT_MS`).
    pub timeout_ms: u64,
    /// Pause after a full download, milliseconds (`LEXWATCH_COURTESY_DELAY_MS`).
    pub courtesy_delay_ms: u64,
    /// Port for the HTTP trigger (`LEXWATCH_HTTP_PORT`).
    pub http_port: u16,
    /// User agent sent with every request (`LEXWATCH_USER_AGENT`).
    pub user_agent: String,
}

impl Config {
    /// Read the configuration from the environment, with defaults.
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("LEXWATCH_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_db_path()),
            timeout_ms: read_env_u64("LEXWATCH_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
            courtesy_delay_ms: read_env_u64("LEXWATCH_COURTESY_DELAY_MS", DEFAULT_COURTESY_DELAY_MS),
            http_port: read_env_u64("LEXWATCH_HTTP_PORT", u64::from(DEFAULT_HTTP_PORT)) as u16,
            user_agent: std::env::var("LEXWATCH_USER_AGENT")
                .unwrap_or_else(|_| default_user_agent()),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".lexwatch")
        .join("catalog.db")
}

fn default_user_agent() -> String {
    format!(
        "lexwatch/{} (+https://github.com/lexwatch/lexwatch)",
        env!("CARGO_PKG_VERSION")
    )
}

fn read_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
