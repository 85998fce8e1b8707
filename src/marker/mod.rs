//! Revision-marker extraction from fetched document fragments.
//!
//! A fragment can be the whole document, a byte-range slice cut mid-tag or
//! even mid-character, and may carry entity-encoded accents. Extraction
//! decodes entities *only for matching*; the byte offset reported for
//! caching is always measured against the raw, still-encoded bytes. The
//! date digits themselves contain no entities, so searching the raw
//! fragment for the matched digit string recovers the raw position exactly.

pub mod date;
pub mod entities;
pub mod rules;

use chrono::NaiveDate;
use rules::CompiledRules;

/// A revision marker located inside a fragment.
#[derive(Debug, Clone)]
pub struct MarkerMatch {
    /// The parsed calendar date.
    pub date: NaiveDate,
    /// The date exactly as it appeared (`DD/MM/YYYY`).
    pub date_text: String,
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Byte offset of the date digits within the raw fragment, when the
    /// digits could be located in the raw bytes.
    pub offset: Option<usize>,
}

/// Extracts the first revision-date marker from a text fragment.
pub struct DateMarkerExtractor {
    rules: CompiledRules,
}

impl DateMarkerExtractor {
    pub fn new() -> Self {
        Self {
            rules: CompiledRules::new(),
        }
    }

    /// Find the first marker in `raw`, or `None`.
    ///
    /// Absence is not an error: partial fragments routinely miss the
    /// marker and the caller is expected to widen its window.
    pub fn extract(&self, raw: &[u8]) -> Option<MarkerMatch> {
        let text = String::from_utf8_lossy(raw);
        let decoded = entities::decode(&text);
        let m = self.rules.first_match(&decoded)?;
        // Shape was validated by the rule table; a capture that is not a
        // real calendar date is discarded like any other non-match.
        let date = date::parse_dmy(&m.date_text)?;
        let offset = find_bytes(raw, m.date_text.as_bytes());
        Some(MarkerMatch {
            date,
            date_text: m.date_text,
            rule: m.rule,
            offset,
        })
    }
}

impl Default for DateMarkerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First occurrence of `needle` in `haystack`, as a byte offset.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
