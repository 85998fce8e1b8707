//! `DD/MM/YYYY` date parsing for marker values.
//!
//! No timezone semantics: marker dates are calendar values compared by
//! equality only.

use chrono::NaiveDate;

/// Parse a `DD/MM/YYYY` string into a calendar date.
///
/// Returns `None` for values that pass the digit-group shape check but are
/// not real calendar dates (e.g. `31/02/2024`).
pub fn parse_dmy(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Format a calendar date back to the marker's `DD/MM/YYYY` shape.
pub fn format_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let d = parse_dmy("05/03/2024").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_rejects_impossible_calendar_date() {
        assert!(parse_dmy("31/02/2024").is_none());
        assert!(parse_dmy("00/01/2024").is_none());
    }

    #[test]
    fn test_format_round_trip() {
        let d = parse_dmy("09/12/2019").unwrap();
        assert_eq!(format_dmy(d), "09/12/2019");
    }

    #[test]
    fn test_equality_is_by_calendar_value() {
        assert_eq!(parse_dmy("01/06/2022"), parse_dmy("01/06/2022"));
        assert_ne!(parse_dmy("01/06/2022"), parse_dmy("02/06/2022"));
    }
}
