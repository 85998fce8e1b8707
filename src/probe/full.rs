//! Tier 3 — unconditional full download.

use crate::fetch::Fetcher;
use crate::marker::DateMarkerExtractor;
use crate::probe::{MarkerHit, TierOutcome, TierReport};
use tracing::debug;

/// Download the whole document and look for the marker.
///
/// Like the progressive tier, a hit records the byte offset of the date
/// digits so the next run can use the anchored tier instead. No marker in
/// the complete body is the cascade's only terminal failure.
pub async fn fetch(fetcher: &Fetcher, extractor: &DateMarkerExtractor, url: &str) -> TierReport {
    let got = match fetcher.get_full(url).await {
        Ok(got) => got,
        Err(e) => {
            debug!(url, error = %e, "full download failed");
            return TierReport::outcome_only(TierOutcome::Transport(e.to_string()));
        }
    };

    let bytes = got.body.len() as u64;
    let outcome = match extractor.extract(&got.body) {
        Some(m) => {
            debug!(url, rule = m.rule, "marker found in full document");
            TierOutcome::Found(MarkerHit {
                date: m.date,
                date_text: m.date_text,
                offset: m.offset.map(|o| o as u64),
                rule: m.rule,
            })
        }
        None => TierOutcome::NotFound,
    };

    TierReport {
        outcome,
        bytes,
        observed_len: got.total_len,
    }
}
