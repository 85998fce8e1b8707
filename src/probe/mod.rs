//! The tiered probing cascade.
//!
//! Strategies ordered by cost in transferred bytes:
//!
//! - Tier 0 [`size`] — HEAD, compare `Content-Length` against the cache
//! - Tier 1 [`anchored`] — narrow range around a cached byte offset
//! - Tier 2 [`progressive`] — growing byte prefixes (50k / 150k / 300k)
//! - Tier 3 [`full`] — download everything
//!
//! Each tier reports a closed [`TierOutcome`]; the orchestrator matches on
//! it exhaustively and decides whether to stop or fall through. Tiers never
//! touch persistent state.

pub mod anchored;
pub mod full;
pub mod progressive;
pub mod size;

use chrono::NaiveDate;

/// A marker located by one of the fetching tiers.
#[derive(Debug, Clone)]
pub struct MarkerHit {
    /// Parsed revision date.
    pub date: NaiveDate,
    /// The date text as found (`DD/MM/YYYY`).
    pub date_text: String,
    /// Absolute byte offset of the date digits within the document, when
    /// it could be determined from the fetched fragment.
    pub offset: Option<u64>,
    /// Which marker rule matched.
    pub rule: &'static str,
}

/// What a single tier concluded.
#[derive(Debug, Clone)]
pub enum TierOutcome {
    /// Content length matches the cached value: the document provably has
    /// not changed and no further tier needs to run.
    Unchanged,
    /// The revision marker was located in the fetched bytes.
    Found(MarkerHit),
    /// The tier ran cleanly but the marker was not in its window.
    NotFound,
    /// The request failed in transport; treated like a non-match and the
    /// cascade continues.
    Transport(String),
}

/// Outcome plus cost accounting for one tier invocation.
#[derive(Debug, Clone)]
pub struct TierReport {
    pub outcome: TierOutcome,
    /// Body bytes transferred by this tier (HEAD counts as zero).
    pub bytes: u64,
    /// Total document length learned from this tier's response, if any.
    pub observed_len: Option<u64>,
}

impl TierReport {
    /// A zero-byte report carrying only an outcome.
    pub fn outcome_only(outcome: TierOutcome) -> Self {
        Self {
            outcome,
            bytes: 0,
            observed_len: None,
        }
    }
}
