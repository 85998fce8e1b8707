//! Tier 1 — narrow range fetch around a cached byte offset.

use crate::fetch::Fetcher;
use crate::marker::DateMarkerExtractor;
use crate::probe::{MarkerHit, TierOutcome, TierReport};
use tracing::debug;

/// Bytes requested before the cached offset.
pub const WINDOW_BEFORE: u64 = 1_000;
/// Bytes requested after the cached offset.
pub const WINDOW_AFTER: u64 = 5_000;

/// Fetch a window around `offset` and look for the marker inside it.
///
/// The cached offset is a hint, never ground truth: success here means the
/// window's bytes re-parsed to a marker, and the offset is reconfirmed as
/// is rather than recomputed. Any failure — transport, a status the range
/// request cannot use, or no marker in the window — falls through silently;
/// a stale offset is the expected cost of content having shifted.
pub async fn fetch(
    fetcher: &Fetcher,
    extractor: &DateMarkerExtractor,
    url: &str,
    offset: u64,
) -> TierReport {
    let start = offset.saturating_sub(WINDOW_BEFORE);
    let end = offset + WINDOW_AFTER;

    let got = match fetcher.get_range(url, start, end).await {
        Ok(got) => got,
        Err(e) => {
            debug!(url, offset, error = %e, "anchored fetch failed");
            return TierReport::outcome_only(TierOutcome::Transport(e.to_string()));
        }
    };

    let bytes = got.body.len() as u64;
    let outcome = match extractor.extract(&got.body) {
        Some(m) => {
            debug!(url, offset, rule = m.rule, "marker reconfirmed at cached offset");
            TierOutcome::Found(MarkerHit {
                date: m.date,
                date_text: m.date_text,
                offset: Some(offset),
                rule: m.rule,
            })
        }
        None => {
            debug!(url, offset, "no marker in anchored window");
            TierOutcome::NotFound
        }
    };

    TierReport {
        outcome,
        bytes,
        observed_len: got.total_len,
    }
}
