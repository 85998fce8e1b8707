//! SQLite catalog of monitored consolidated-law documents.
//!
//! Documents are created administratively (`lexwatch add`) and mutated by
//! the monitor on every poll. The engine never deletes entries.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A monitored document and its cached probing state.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoredLaw {
    pub id: i64,
    /// Short name used as the external identifier (e.g. "lopdgdd").
    pub slug: String,
    /// Human-readable title.
    pub name: String,
    /// Remote location of the consolidated text.
    pub source_url: String,
    /// Timestamp of the most recent poll attempt, success or not.
    pub last_checked: Option<DateTime<Utc>>,
    /// Last observed revision date from the document's marker.
    pub last_update_boe: Option<NaiveDate>,
    /// Best-known byte position of the marker; a hint, never ground truth.
    pub date_byte_offset: Option<u64>,
    /// Best-known total byte size of the document.
    pub boe_content_length: Option<u64>,
    /// Set to "changed" when a poll observed a new revision date.
    pub change_status: Option<String>,
    pub change_detected_at: Option<DateTime<Utc>>,
}

/// Catalog handle over a SQLite database.
///
/// The connection sits behind a mutex so the catalog can be shared with the
/// HTTP trigger's async handlers; locks are never held across an await.
pub struct Catalog {
    db: Mutex<Connection>,
}

impl Catalog {
    /// Open or create a catalog database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating catalog dir: {}", parent.display()))?;
        }
        let db = Connection::open(path)
            .with_context(|| format!("failed to open catalog: {}", path.display()))?;

        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS monitored_laws (
                id INTEGER PRIMARY KEY,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                source_url TEXT NOT NULL,
                last_checked TEXT,
                last_update_boe TEXT,
                date_byte_offset INTEGER,
                boe_content_length INTEGER,
                change_status TEXT,
                change_detected_at TEXT
            );",
        )
        .context("failed to create monitored_laws table")?;

        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the default catalog at `~/.lexwatch/catalog.db`.
    pub fn open_default() -> Result<Self> {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".lexwatch")
            .join("catalog.db");
        Self::open(&path)
    }

    /// Register a document, or update its name and URL if the slug exists.
    ///
    /// Cached probing state of an existing entry is left untouched.
    pub fn add(&self, slug: &str, name: &str, source_url: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO monitored_laws (slug, name, source_url) VALUES (?1, ?2, ?3)
                 ON CONFLICT(slug) DO UPDATE SET name = ?2, source_url = ?3",
                rusqlite::params![slug, name, source_url],
            )
            .with_context(|| format!("failed to register document '{slug}'"))?;
        Ok(())
    }

    /// All monitored documents, ordered by slug.
    pub fn list(&self) -> Result<Vec<MonitoredLaw>> {
        let db = self.conn();
        let mut stmt = db
            .prepare("SELECT * FROM monitored_laws ORDER BY slug")
            .context("failed to query catalog")?;
        let rows = stmt
            .query_map([], row_to_law)
            .context("failed to read catalog rows")?;
        let mut laws = Vec::new();
        for row in rows {
            laws.push(row.context("failed to decode catalog row")?);
        }
        Ok(laws)
    }

    /// Look up a single document by its slug.
    pub fn find(&self, slug: &str) -> Result<Option<MonitoredLaw>> {
        self.conn()
            .query_row(
                "SELECT * FROM monitored_laws WHERE slug = ?1",
                [slug],
                row_to_law,
            )
            .optional()
            .with_context(|| format!("failed to look up document '{slug}'"))
    }

    /// Persist the outcome of a successful poll.
    ///
    /// Always bumps `last_checked`. The revision date, offset and content
    /// length are written when present and otherwise keep their cached
    /// values. `change_detected_at` is set only when the caller classified
    /// this poll as a change.
    pub fn record_success(
        &self,
        slug: &str,
        checked_at: DateTime<Utc>,
        revision: Option<NaiveDate>,
        offset: Option<u64>,
        content_length: Option<u64>,
        change_detected_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.conn()
            .execute(
                "UPDATE monitored_laws SET
                    last_checked = ?2,
                    last_update_boe = COALESCE(?3, last_update_boe),
                    date_byte_offset = COALESCE(?4, date_byte_offset),
                    boe_content_length = COALESCE(?5, boe_content_length),
                    change_status = CASE WHEN ?6 IS NOT NULL THEN 'changed' ELSE change_status END,
                    change_detected_at = COALESCE(?6, change_detected_at)
                 WHERE slug = ?1",
                rusqlite::params![
                    slug,
                    checked_at.to_rfc3339(),
                    revision.map(|d| d.format("%Y-%m-%d").to_string()),
                    offset.map(|o| o as i64),
                    content_length.map(|l| l as i64),
                    change_detected_at.map(|t| t.to_rfc3339()),
                ],
            )
            .with_context(|| format!("failed to record poll for '{slug}'"))?;
        Ok(())
    }

    /// Persist a failed poll: only `last_checked` moves, so the next run
    /// retries the document from scratch.
    pub fn record_failure(&self, slug: &str, checked_at: DateTime<Utc>) -> Result<()> {
        self.conn()
            .execute(
                "UPDATE monitored_laws SET last_checked = ?2 WHERE slug = ?1",
                rusqlite::params![slug, checked_at.to_rfc3339()],
            )
            .with_context(|| format!("failed to record failed poll for '{slug}'"))?;
        Ok(())
    }

    /// Administrative reset of a document's change flag.
    pub fn clear_change(&self, slug: &str) -> Result<()> {
        self.conn()
            .execute(
                "UPDATE monitored_laws SET change_status = NULL, change_detected_at = NULL
                 WHERE slug = ?1",
                [slug],
            )
            .with_context(|| format!("failed to clear change flag for '{slug}'"))?;
        Ok(())
    }
}

fn row_to_law(row: &Row<'_>) -> rusqlite::Result<MonitoredLaw> {
    Ok(MonitoredLaw {
        id: row.get("id")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
        source_url: row.get("source_url")?,
        last_checked: row
            .get::<_, Option<String>>("last_checked")?
            .and_then(|s| parse_timestamp(&s)),
        last_update_boe: row
            .get::<_, Option<String>>("last_update_boe")?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        date_byte_offset: row
            .get::<_, Option<i64>>("date_byte_offset")?
            .and_then(|v| u64::try_from(v).ok()),
        boe_content_length: row
            .get::<_, Option<i64>>("boe_content_length")?
            .and_then(|v| u64::try_from(v).ok()),
        change_status: row.get("change_status")?,
        change_detected_at: row
            .get::<_, Option<String>>("change_detected_at")?
            .and_then(|s| parse_timestamp(&s)),
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
