// src/utils/normalize.rs

/// Canonical form used for every answer comparison and fingerprint.
///
/// Lower-cases, collapses whitespace runs to a single space and trims.
/// Two strings that differ only in case or whitespace normalize identically.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized equality, the only answer-matching rule the engine uses.
pub fn answers_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize("  Hello \t  World\n"), "hello world");
        assert_eq!(normalize("A\u{00a0}B"), "a b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["", "   ", "Mixed CASE  text", "\tTabs\tand\nlines ", "ÄÖÜ  Straße"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_blank_normalizes_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_answers_match() {
        assert!(answers_match("Boolean", "  boolean "));
        assert!(!answers_match("Boolean", "Bool"));
    }
}
