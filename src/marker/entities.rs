//! Fixed HTML-entity substitution table for the revision-marker phrase.
//!
//! Consolidated-text pages ship the marker phrase with the accented
//! characters entity-encoded ("&Uacute;ltima actualizaci&oacute;n ...").
//! Only the entities that actually occur around the marker are decoded;
//! this is not a general-purpose HTML decoder.

use std::borrow::Cow;

/// Entity → replacement pairs, applied in order.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("&aacute;", "á"),
    ("&eacute;", "é"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&uacute;", "ú"),
    ("&Aacute;", "Á"),
    ("&Eacute;", "É"),
    ("&Iacute;", "Í"),
    ("&Oacute;", "Ó"),
    ("&Uacute;", "Ú"),
    ("&ntilde;", "ñ"),
    ("&Ntilde;", "Ñ"),
    ("&nbsp;", " "),
];

/// Decode the marker-relevant entities in a text fragment.
///
/// Returns the input unchanged (borrowed) when it contains no `&` at all,
/// which is the common case for plain-text fragments.
pub fn decode(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = text.to_string();
    for (entity, replacement) in SUBSTITUTIONS {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_marker_phrase() {
        let raw = "&Uacute;ltima actualizaci&oacute;n publicada el 05/03/2024";
        assert_eq!(decode(raw), "Última actualización publicada el 05/03/2024");
    }

    #[test]
    fn test_decode_borrows_when_clean() {
        let raw = "texto sin entidades";
        assert!(matches!(decode(raw), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_leaves_unknown_entities() {
        // Entities outside the table pass through untouched.
        assert_eq!(decode("&copy; 2024"), "&copy; 2024");
    }

    #[test]
    fn test_decode_nbsp() {
        assert_eq!(decode("publicada&nbsp;el"), "publicada el");
    }
}
