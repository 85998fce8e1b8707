//! Tier 0 — metadata-only size probe.
//!
//! A changed byte count is a necessary but not sufficient condition for
//! changed content, so an unchanged count is a cheap proof of "no change"
//! while a changed count only means "inspect further".

use crate::fetch::Fetcher;
use crate::probe::{TierOutcome, TierReport};
use tracing::debug;

/// HEAD the document and compare its declared length against the cache.
///
/// The comparison only produces [`TierOutcome::Unchanged`] when both a
/// cached length and a previously known revision date exist; a first-ever
/// poll has nothing to compare against, but the observed length is still
/// carried forward in the report so the orchestrator can cache it.
pub async fn probe(
    fetcher: &Fetcher,
    url: &str,
    cached_len: Option<u64>,
    has_known_revision: bool,
) -> TierReport {
    let declared = match fetcher.head_content_length(url).await {
        Ok(len) => len,
        Err(e) => {
            debug!(url, error = %e, "size probe failed in transport");
            return TierReport::outcome_only(TierOutcome::Transport(e.to_string()));
        }
    };

    let Some(len) = declared else {
        debug!(url, "no length available");
        return TierReport::outcome_only(TierOutcome::NotFound);
    };

    let outcome = match cached_len {
        Some(cached) if has_known_revision && cached == len => {
            debug!(url, len, "content length unchanged");
            TierOutcome::Unchanged
        }
        Some(cached) if has_known_revision => {
            debug!(url, cached, len, "content length changed");
            TierOutcome::NotFound
        }
        _ => {
            debug!(url, len, "no cached length to compare");
            TierOutcome::NotFound
        }
    };

    TierReport {
        outcome,
        bytes: 0,
        observed_len: Some(len),
    }
}
