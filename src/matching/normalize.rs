//! Deterministic canonicalization of free-text road names.

use crate::matching::types::CanonicalName;

/// Substring expansions, applied in order to the whole string.
const EXPANSIONS: &[(&str, &str)] = &[
    (" rd", " road"),
    (" st", " street"),
    (" blvd", " boulevard"),
    (" ave", " avenue"),
    ("mg ", "m g "),
];

/// Canonicalizes a raw road or intersection name.
///
/// Lower-cases and trims the input, drops every character other than ASCII
/// lowercase letters, digits and spaces, then applies [`EXPANSIONS`].
/// `None` and empty input both give the empty string.
pub fn normalize(raw: Option<&str>) -> CanonicalName {
    let Some(raw) = raw else {
        return String::new();
    };
    if raw.is_empty() {
        return String::new();
    }

    let mut name: String = raw
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();

    for (from, to) in EXPANSIONS {
        name = name.replace(from, to);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
    }

    #[test]
    fn test_abbreviations_expand() {
        assert_eq!(normalize(Some("MG Rd")), "m g road");
        assert_eq!(normalize(Some("MG Road")), "m g road");
        assert_eq!(normalize(Some("Church St")), "church street");
        assert_eq!(normalize(Some("Sarjapur Blvd")), "sarjapur boulevard");
        assert_eq!(normalize(Some("Park Ave")), "park avenue");
    }

    #[test]
    fn test_punctuation_is_dropped() {
        assert_eq!(normalize(Some("  Hosur Rd. ")), "hosur road");
        assert_eq!(normalize(Some("Silk Board Jn.")), "silk board jn");
        assert_eq!(normalize(Some("CMH-Road")), "cmhroad");
    }

    #[test]
    fn test_expansions_match_inside_words() {
        // " st" is a plain substring rule, so it also fires mid-name.
        assert_eq!(normalize(Some("Stone St")), "stone street");
        assert_eq!(normalize(Some("Old Station Rd")), "old streetation road");
    }

    #[test]
    fn test_single_application_is_stable() {
        for raw in ["MG Rd", "Outer Ring Road", "Bellary Rd", "100 Feet Road"] {
            assert_eq!(normalize(Some(raw)), normalize(Some(raw)));
        }
        assert_eq!(normalize(Some("m g road")), "m g road");
    }

    #[test]
    fn test_not_idempotent_on_expanded_street() {
        let once = normalize(Some("Church St"));
        assert_eq!(once, "church street");
        assert_eq!(normalize(Some(&once)), "church streetreet");
    }
}
