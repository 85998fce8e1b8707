//! Ordered marker-pattern rule table.
//!
//! The patterns are nested in specificity: a page carrying the full
//! "última actualización publicada el ..." phrase also matches the looser
//! rules below it, so the table is walked top to bottom and the first
//! match wins. Reordering entries changes behavior.

use regex::Regex;

/// One entry in the ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    /// Stable rule name, used in logs and per-result detail.
    pub name: &'static str,
    /// Pattern with a single capture group holding the date.
    pub pattern: &'static str,
}

/// The rule table, highest priority first.
pub const MARKER_RULES: &[MarkerRule] = &[
    MarkerRule {
        name: "ultima-actualizacion-publicada",
        pattern: r"(?i)última\s+actualización,?\s+publicada\s+el\s+(\d{2}/\d{2}/\d{4})",
    },
    MarkerRule {
        name: "actualizacion-publicada",
        pattern: r"(?i)actualización\s+publicada\s+el\s+(\d{2}/\d{2}/\d{4})",
    },
    MarkerRule {
        name: "ultima-modificacion",
        pattern: r"(?i)última\s+modificación:?\s+(\d{2}/\d{2}/\d{4})",
    },
    MarkerRule {
        name: "publicado-el",
        pattern: r"(?i)publicad[oa]\s+el\s+(\d{2}/\d{2}/\d{4})",
    },
];

/// A date string matched by one of the rules.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// The captured date text, validated as `DD/MM/YYYY`.
    pub date_text: String,
}

/// The rule table with its patterns compiled.
pub struct CompiledRules {
    rules: Vec<(&'static str, Regex)>,
    strict_date: Regex,
}

impl CompiledRules {
    /// Compile the static rule table.
    pub fn new() -> Self {
        let rules = MARKER_RULES
            .iter()
            .map(|r| {
                let re = Regex::new(r.pattern)
                    .expect("static marker pattern must compile");
                (r.name, re)
            })
            .collect();
        let strict_date =
            Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("static date pattern must compile");
        Self { rules, strict_date }
    }

    /// Try every rule in priority order and return the first valid capture.
    ///
    /// Captures that fail the strict `DD/MM/YYYY` digit-group check are
    /// discarded silently and the walk continues with the next rule.
    pub fn first_match(&self, text: &str) -> Option<RuleMatch> {
        for (name, re) in &self.rules {
            if let Some(caps) = re.captures(text) {
                if let Some(date) = caps.get(1) {
                    if self.strict_date.is_match(date.as_str()) {
                        return Some(RuleMatch {
                            rule: name,
                            date_text: date.as_str().to_string(),
                        });
                    }
                }
            }
        }
        None
    }
}

impl Default for CompiledRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_specific_rule_wins() {
        let rules = CompiledRules::new();
        // This text matches the first, second and fourth rules; the first
        // must win, deterministically.
        let text = "Última actualización publicada el 05/03/2024";
        let m = rules.first_match(text).unwrap();
        assert_eq!(m.rule, "ultima-actualizacion-publicada");
        assert_eq!(m.date_text, "05/03/2024");
    }

    #[test]
    fn test_comma_variant() {
        let rules = CompiledRules::new();
        let m = rules
            .first_match("Última actualización, publicada el 12/11/2023")
            .unwrap();
        assert_eq!(m.rule, "ultima-actualizacion-publicada");
    }

    #[test]
    fn test_fallback_rule_applies() {
        let rules = CompiledRules::new();
        let m = rules.first_match("texto publicado el 01/02/2020").unwrap();
        assert_eq!(m.rule, "publicado-el");
    }

    #[test]
    fn test_case_insensitive() {
        let rules = CompiledRules::new();
        let m = rules
            .first_match("ÚLTIMA ACTUALIZACIÓN PUBLICADA EL 09/09/2021")
            .unwrap();
        assert_eq!(m.rule, "ultima-actualizacion-publicada");
    }

    #[test]
    fn test_single_digit_dates_rejected() {
        let rules = CompiledRules::new();
        // The digit groups are strict: 5/3/2024 is not a valid marker date.
        assert!(rules.first_match("publicada el 5/3/2024").is_none());
    }

    #[test]
    fn test_no_marker_no_match() {
        let rules = CompiledRules::new();
        assert!(rules.first_match("<html><body>nada que ver</body>").is_none());
    }

    #[test]
    fn test_two_markers_first_occurrence_of_top_rule() {
        let rules = CompiledRules::new();
        let text = "publicado el 01/01/2000 ... Última actualización publicada el 05/03/2024";
        // The higher-priority rule matches later in the text but still wins.
        let m = rules.first_match(text).unwrap();
        assert_eq!(m.rule, "ultima-actualizacion-publicada");
        assert_eq!(m.date_text, "05/03/2024");
    }
}
