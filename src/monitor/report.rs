//! Per-document poll results and run-wide statistics.
//!
//! Each document poll produces one immutable [`PollResult`]; the run folds
//! them into a [`RunStats`] value. Nothing here is shared or mutated across
//! documents, which keeps the door open for a parallel runner later.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::marker::date::format_dmy;

/// How a document was resolved in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollMethod {
    /// Tier 0: content length matched the cache, nothing downloaded.
    #[serde(rename = "head_unchanged")]
    HeadUnchanged,
    /// Tier 1: marker reconfirmed inside the cached-offset window.
    #[serde(rename = "cached_offset")]
    CachedOffset,
    /// Tier 2: marker inside the first 50 kB prefix.
    #[serde(rename = "partial_50k")]
    Partial50k,
    /// Tier 2: marker inside the first 150 kB prefix.
    #[serde(rename = "partial_150k")]
    Partial150k,
    /// Tier 2: marker inside the first 300 kB prefix.
    #[serde(rename = "partial_300k")]
    Partial300k,
    /// Tier 3: full download.
    #[serde(rename = "full")]
    Full,
    /// Every tier exhausted without a usable marker.
    #[serde(rename = "error")]
    Error,
}

impl PollMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadUnchanged => "head_unchanged",
            Self::CachedOffset => "cached_offset",
            Self::Partial50k => "partial_50k",
            Self::Partial150k => "partial_150k",
            Self::Partial300k => "partial_300k",
            Self::Full => "full",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for PollMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of polling one document, consumed by the run fold and — for
/// single-document runs — returned verbatim in the response detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResult {
    /// Document slug.
    pub law: String,
    pub name: String,
    pub method: PollMethod,
    /// Revision date observed this run (the cached one for `head_unchanged`).
    #[serde(serialize_with = "ser_dmy_opt")]
    pub date: Option<NaiveDate>,
    /// Revision date known before this run.
    #[serde(serialize_with = "ser_dmy_opt")]
    pub previous: Option<NaiveDate>,
    /// Whether this poll observed a different date than a previously known one.
    pub changed: bool,
    /// Body bytes transferred across every tier that ran.
    pub bytes: u64,
    /// Marker byte offset carried to the cache, if any.
    pub offset: Option<u64>,
    /// Document content length carried to the cache, if any.
    pub content_length: Option<u64>,
    /// Terminal failure reason, only for `method == error`.
    pub error: Option<String>,
}

fn ser_dmy_opt<S: Serializer>(d: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&format_dmy(*d)),
        None => s.serialize_none(),
    }
}

/// A detected revision change, reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeNotice {
    pub law: String,
    pub name: String,
    #[serde(rename = "oldDate")]
    pub old_date: String,
    #[serde(rename = "newDate")]
    pub new_date: String,
}

/// Count and byte cost of one resolution method.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TierTally {
    pub count: usize,
    pub bytes: u64,
}

impl TierTally {
    fn absorb(&mut self, bytes: u64) {
        self.count += 1;
        self.bytes += bytes;
    }
}

/// Aggregate statistics for one run.
#[derive(Debug, Default, Serialize)]
pub struct RunStats {
    /// Documents in the catalog (after the single-law filter).
    pub considered: usize,
    /// Excluded by the recency filter before any network call.
    pub skipped_recent: usize,
    /// Documents actually polled.
    pub checked: usize,
    pub changes: usize,
    pub total_bytes: u64,
    pub head_unchanged: TierTally,
    pub cached_offset: TierTally,
    pub partial_50k: TierTally,
    pub partial_150k: TierTally,
    pub partial_300k: TierTally,
    pub full: TierTally,
    pub errors: TierTally,
}

impl RunStats {
    /// Fold one poll result into the aggregate.
    pub fn absorb(&mut self, result: &PollResult) {
        self.checked += 1;
        self.total_bytes += result.bytes;
        if result.changed {
            self.changes += 1;
        }
        let tally = match result.method {
            PollMethod::HeadUnchanged => &mut self.head_unchanged,
            PollMethod::CachedOffset => &mut self.cached_offset,
            PollMethod::Partial50k => &mut self.partial_50k,
            PollMethod::Partial150k => &mut self.partial_150k,
            PollMethod::Partial300k => &mut self.partial_300k,
            PollMethod::Full => &mut self.full,
            PollMethod::Error => &mut self.errors,
        };
        tally.absorb(result.bytes);
    }

    /// Documents resolved to a revision date this run.
    pub fn resolved(&self) -> usize {
        self.checked - self.errors.count
    }

    /// Fraction of resolved documents that avoided a full download.
    pub fn optimization_ratio(&self) -> f64 {
        let resolved = self.resolved();
        if resolved == 0 {
            return 0.0;
        }
        (resolved - self.full.count) as f64 / resolved as f64
    }

    pub fn average_bytes(&self) -> u64 {
        if self.checked == 0 {
            0
        } else {
            self.total_bytes / self.checked as u64
        }
    }

    /// One-line human summary for logs and the CLI.
    pub fn efficiency_summary(&self) -> String {
        format!(
            "{} of {} resolved without a full download ({:.1}% efficient, avg {} per document)",
            self.resolved() - self.full.count,
            self.resolved(),
            self.optimization_ratio() * 100.0,
            human_bytes(self.average_bytes()),
        )
    }

    /// The `stats` object of the trigger response.
    pub fn to_json(&self) -> serde_json::Value {
        let tier = |t: &TierTally| {
            serde_json::json!({
                "count": t.count,
                "bytes": t.bytes,
                "bytesHuman": human_bytes(t.bytes),
            })
        };
        serde_json::json!({
            "considered": self.considered,
            "skippedRecent": self.skipped_recent,
            "checked": self.checked,
            "changes": self.changes,
            "errors": self.errors.count,
            "totalBytes": self.total_bytes,
            "totalBytesHuman": human_bytes(self.total_bytes),
            "averageBytes": self.average_bytes(),
            "optimizationRatio": self.optimization_ratio(),
            "efficiency": self.efficiency_summary(),
            "byMethod": {
                "head_unchanged": tier(&self.head_unchanged),
                "cached_offset": tier(&self.cached_offset),
                "partial_50k": tier(&self.partial_50k),
                "partial_150k": tier(&self.partial_150k),
                "partial_300k": tier(&self.partial_300k),
                "full": tier(&self.full),
                "error": tier(&self.errors),
            },
        })
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub duration: Duration,
    pub stats: RunStats,
    pub changes: Vec<ChangeNotice>,
    /// Per-document detail, populated only for single-document runs.
    pub results: Option<Vec<PollResult>>,
}

impl RunReport {
    /// The trigger response body.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "success": true,
            "duration": self.duration.as_secs_f64(),
            "stats": self.stats.to_json(),
            "changes": self.changes,
        });
        if let Some(results) = &self.results {
            body["results"] = serde_json::to_value(results).unwrap_or_default();
        }
        body
    }
}

/// Render a byte count for humans.
pub fn human_bytes(n: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if n < KB {
        format!("{n} B")
    } else if n < MB {
        format!("{:.1} KB", n as f64 / KB as f64)
    } else {
        format!("{:.1} MB", n as f64 / MB as f64)
    }
}
