//! Tier 2 — growing byte-prefix fetches.
//!
//! Three fixed thresholds, tried in ascending order. The first prefix that
//! contains the marker stops the walk; the byte cost reported is the
//! cumulative total across every prefix requested, because each larger
//! request re-transfers the earlier bytes.

use crate::fetch::Fetcher;
use crate::marker::DateMarkerExtractor;
use crate::probe::{MarkerHit, TierOutcome};
use tracing::{debug, warn};

/// Prefix sizes in bytes, ascending.
pub const THRESHOLDS: [u64; 3] = [50_000, 150_000, 300_000];

/// Result of walking the prefix thresholds.
#[derive(Debug, Clone)]
pub struct ProgressiveReport {
    pub outcome: TierOutcome,
    /// Cumulative bytes across all prefixes requested.
    pub bytes: u64,
    /// Total document length learned from any response.
    pub observed_len: Option<u64>,
    /// The threshold whose prefix contained the marker, when found.
    pub matched_threshold: Option<u64>,
}

/// Fetch growing prefixes of the document until the marker appears.
///
/// A transport error at one threshold moves on to the next; only the
/// exhaustion of all three without a match is reported as a non-find.
pub async fn fetch(
    fetcher: &Fetcher,
    extractor: &DateMarkerExtractor,
    url: &str,
) -> ProgressiveReport {
    let mut bytes = 0u64;
    let mut observed_len: Option<u64> = None;
    let mut any_response = false;
    let mut last_error = String::new();

    for &limit in &THRESHOLDS {
        let got = match fetcher.get_range(url, 0, limit - 1).await {
            Ok(got) => got,
            Err(e) => {
                warn!(url, limit, error = %e, "prefix fetch failed, trying next threshold");
                last_error = e.to_string();
                continue;
            }
        };

        any_response = true;
        bytes += got.body.len() as u64;
        observed_len = got.total_len.or(observed_len);

        if let Some(m) = extractor.extract(&got.body) {
            debug!(url, limit, rule = m.rule, "marker found in prefix");
            // The prefix starts at byte zero, so the fragment offset of the
            // date digits is already absolute.
            return ProgressiveReport {
                outcome: TierOutcome::Found(MarkerHit {
                    date: m.date,
                    date_text: m.date_text,
                    offset: m.offset.map(|o| o as u64),
                    rule: m.rule,
                }),
                bytes,
                observed_len,
                matched_threshold: Some(limit),
            };
        }
        debug!(url, limit, "no marker in prefix");
    }

    let outcome = if any_response {
        TierOutcome::NotFound
    } else {
        TierOutcome::Transport(last_error)
    };
    ProgressiveReport {
        outcome,
        bytes,
        observed_len,
        matched_threshold: None,
    }
}
