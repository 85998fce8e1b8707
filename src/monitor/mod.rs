//! Poll orchestration — the per-document tier cascade and the run loop.
//!
//! Documents are processed strictly sequentially, one request in flight at
//! a time. The remote host is a third party with unknown rate limits, so
//! the design accepts a longer run in exchange for predictable load. Each
//! document reads only its own cached fields and writes only its own row;
//! the statistics fold is the only run-wide state.

pub mod report;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::catalog::{Catalog, MonitoredLaw};
use crate::config::Config;
use crate::fetch::Fetcher;
use crate::marker::DateMarkerExtractor;
use crate::probe::{anchored, full, progressive, size, TierOutcome};
use report::{ChangeNotice, PollMethod, PollResult, RunReport, RunStats};

/// Parameters of one check run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Skip documents checked within the last `hours`.
    pub skip_recent: bool,
    /// Recency threshold in hours.
    pub hours: u32,
    /// Restrict the run to a single document by slug.
    pub law: Option<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            skip_recent: true,
            hours: 12,
            law: None,
        }
    }
}

/// The change-detection engine over a catalog of monitored documents.
pub struct Monitor {
    catalog: Catalog,
    fetcher: Fetcher,
    extractor: DateMarkerExtractor,
    courtesy_delay: Duration,
}

impl Monitor {
    pub fn new(catalog: Catalog, config: &Config) -> Self {
        Self {
            catalog,
            fetcher: Fetcher::new(config.timeout_ms, &config.user_agent),
            extractor: DateMarkerExtractor::new(),
            courtesy_delay: Duration::from_millis(config.courtesy_delay_ms),
        }
    }

    /// The monitored documents, for listing surfaces.
    pub fn documents(&self) -> Result<Vec<MonitoredLaw>> {
        self.catalog.list()
    }

    /// Run one check cycle.
    ///
    /// Only a failure to read the catalog (or an unknown `law` filter)
    /// aborts the run; every per-document failure is captured as data in
    /// the report and the iteration continues.
    pub async fn run(&self, opts: &CheckOptions) -> Result<RunReport> {
        let started = Instant::now();
        let mut laws = self
            .catalog
            .list()
            .context("cannot list monitored documents")?;

        if let Some(slug) = &opts.law {
            laws.retain(|l| &l.slug == slug);
            if laws.is_empty() {
                bail!("unknown document: {slug}");
            }
        }

        let mut stats = RunStats::default();
        let mut changes = Vec::new();
        let mut results = Vec::new();
        let now = Utc::now();

        for law in &laws {
            stats.considered += 1;

            if opts.skip_recent && checked_recently(law.last_checked, now, opts.hours) {
                tracing::debug!(law = %law.slug, "checked recently, skipping");
                stats.skipped_recent += 1;
                continue;
            }

            let result = self.poll(law).await;
            self.persist(law, &result);

            if result.changed {
                if let (Some(old), Some(new)) = (result.previous, result.date) {
                    info!(law = %law.slug, old = %old, new = %new, "revision change detected");
                    changes.push(ChangeNotice {
                        law: law.slug.clone(),
                        name: law.name.clone(),
                        old_date: crate::marker::date::format_dmy(old),
                        new_date: crate::marker::date::format_dmy(new),
                    });
                }
            }

            info!(
                law = %law.slug,
                method = %result.method,
                bytes = result.bytes,
                "poll complete"
            );
            stats.absorb(&result);

            // A full download leans on the remote server; pause before the
            // next document. Cheaper tiers move on immediately.
            let hit_origin_hard = matches!(result.method, PollMethod::Full | PollMethod::Error);
            results.push(result);
            if hit_origin_hard && !self.courtesy_delay.is_zero() {
                tokio::time::sleep(self.courtesy_delay).await;
            }
        }

        info!(
            checked = stats.checked,
            skipped = stats.skipped_recent,
            changes = stats.changes,
            total_bytes = stats.total_bytes,
            "{}",
            stats.efficiency_summary()
        );

        Ok(RunReport {
            duration: started.elapsed(),
            stats,
            changes,
            results: opts.law.is_some().then_some(results),
        })
    }

    /// Run the tier cascade for one document. Never fails the run.
    async fn poll(&self, law: &MonitoredLaw) -> PollResult {
        let url = &law.source_url;
        let mut total_bytes = 0u64;
        let mut observed_len: Option<u64> = None;

        // Tier 0 — size probe. Even when the comparison cannot run (first
        // poll), the observed length is kept for caching.
        let t0 = size::probe(
            &self.fetcher,
            url,
            law.boe_content_length,
            law.last_update_boe.is_some(),
        )
        .await;
        observed_len = t0.observed_len.or(observed_len);
        if matches!(t0.outcome, TierOutcome::Unchanged) {
            return PollResult {
                law: law.slug.clone(),
                name: law.name.clone(),
                method: PollMethod::HeadUnchanged,
                date: law.last_update_boe,
                previous: law.last_update_boe,
                changed: false,
                bytes: 0,
                offset: law.date_byte_offset,
                content_length: observed_len.or(law.boe_content_length),
                error: None,
            };
        }

        // Tier 1 — anchored range, only with a cached offset to anchor on.
        if let Some(offset) = law.date_byte_offset {
            let t1 = anchored::fetch(&self.fetcher, &self.extractor, url, offset).await;
            total_bytes += t1.bytes;
            observed_len = t1.observed_len.or(observed_len);
            if let TierOutcome::Found(hit) = t1.outcome {
                return self.success(law, PollMethod::CachedOffset, hit, total_bytes, observed_len);
            }
            // Stale offset: expected when content shifted, fall through.
        }

        // Tier 2 — progressive prefixes.
        let t2 = progressive::fetch(&self.fetcher, &self.extractor, url).await;
        total_bytes += t2.bytes;
        observed_len = t2.observed_len.or(observed_len);
        if let TierOutcome::Found(hit) = t2.outcome {
            let method = match t2.matched_threshold {
                Some(50_000) => PollMethod::Partial50k,
                Some(150_000) => PollMethod::Partial150k,
                _ => PollMethod::Partial300k,
            };
            return self.success(law, method, hit, total_bytes, observed_len);
        }

        // Tier 3 — full download, the last resort.
        let t3 = full::fetch(&self.fetcher, &self.extractor, url).await;
        total_bytes += t3.bytes;
        observed_len = t3.observed_len.or(observed_len);
        match t3.outcome {
            TierOutcome::Found(hit) => {
                self.success(law, PollMethod::Full, hit, total_bytes, observed_len)
            }
            TierOutcome::Transport(detail) => {
                warn!(law = %law.slug, detail = %detail, "document unreachable this run");
                self.failure(law, format!("transport: {detail}"), total_bytes)
            }
            _ => {
                warn!(law = %law.slug, "no revision marker in full document");
                self.failure(law, "marker_not_found".to_string(), total_bytes)
            }
        }
    }

    fn success(
        &self,
        law: &MonitoredLaw,
        method: PollMethod,
        hit: crate::probe::MarkerHit,
        bytes: u64,
        observed_len: Option<u64>,
    ) -> PollResult {
        // A first successful poll (no prior revision) is never a change.
        let changed = law
            .last_update_boe
            .is_some_and(|previous| previous != hit.date);
        PollResult {
            law: law.slug.clone(),
            name: law.name.clone(),
            method,
            date: Some(hit.date),
            previous: law.last_update_boe,
            changed,
            bytes,
            offset: hit.offset.or(law.date_byte_offset),
            content_length: observed_len.or(law.boe_content_length),
            error: None,
        }
    }

    fn failure(&self, law: &MonitoredLaw, reason: String, bytes: u64) -> PollResult {
        PollResult {
            law: law.slug.clone(),
            name: law.name.clone(),
            method: PollMethod::Error,
            date: None,
            previous: law.last_update_boe,
            changed: false,
            bytes,
            offset: None,
            content_length: None,
            error: Some(reason),
        }
    }

    /// Write a poll outcome back to the catalog. Persistence problems are
    /// logged and swallowed: they must not abort the remaining documents.
    fn persist(&self, law: &MonitoredLaw, result: &PollResult) {
        let now = Utc::now();
        let persisted = if result.method == PollMethod::Error {
            self.catalog.record_failure(&law.slug, now)
        } else {
            self.catalog.record_success(
                &law.slug,
                now,
                result.date,
                result.offset,
                result.content_length,
                result.changed.then_some(now),
            )
        };
        if let Err(e) = persisted {
            warn!(law = %law.slug, error = %e, "failed to persist poll outcome");
        }
    }
}

/// Whether `last_checked` falls within the last `hours` hours.
fn checked_recently(last_checked: Option<DateTime<Utc>>, now: DateTime<Utc>, hours: u32) -> bool {
    match last_checked {
        Some(t) => now.signed_duration_since(t) < ChronoDuration::hours(i64::from(hours)),
        None => false,
    }
}
