// src/utils/fingerprint.rs

use std::sync::LazyLock;

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::utils::normalize::normalize;

/// Standalone numeric literals and bare identifiers, matched in one pass so
/// the placeholders themselves are never rewritten again.
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]+(?:\.[0-9]+)?\b|\b[a-zA-Z_][a-zA-Z0-9_]*\b")
        .expect("token regex is valid")
});

/// Words that carry the meaning of a question and survive template normalization.
const RETAINED_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "return", "function", "int", "str", "float", "boolean",
    "true", "false", "list", "dict", "tuple", "sql", "select", "where", "group", "by", "and",
    "or", "not",
];

const NUM_PLACEHOLDER: &str = "<NUM>";
const VAR_PLACEHOLDER: &str = "<VAR>";

/// Collapses numbers and identifier names so disguised repeats share one form.
///
/// `"What is x + 10?"` and `"What is  Y + 3?"` both become `"<VAR> <VAR> <VAR> + <NUM>?"`.
pub fn template_normalize(text: &str) -> String {
    let normalized = normalize(text);

    TOKEN_REGEX
        .replace_all(&normalized, |caps: &Captures| {
            let token = &caps[0];
            if token.starts_with(|c: char| c.is_ascii_digit()) {
                NUM_PLACEHOLDER.to_string()
            } else if RETAINED_KEYWORDS.contains(&token) {
                token.to_string()
            } else {
                VAR_PLACEHOLDER.to_string()
            }
        })
        .into_owned()
}

/// Fingerprint of the normalized question text; detects verbatim repeats.
pub fn exact_fingerprint(question: &str) -> String {
    sha256_hex(&normalize(question))
}

/// Fingerprint of the template form; detects structurally identical questions.
pub fn template_fingerprint(question: &str) -> String {
    sha256_hex(&template_normalize(question))
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fingerprint_ignores_case_and_whitespace() {
        assert_eq!(
            exact_fingerprint("What is   a Loop?"),
            exact_fingerprint("  what IS a loop? ")
        );
        assert_ne!(exact_fingerprint("What is a loop?"), exact_fingerprint("What is a list?"));
    }

    #[test]
    fn test_fingerprint_is_fixed_length_hex() {
        let hash = exact_fingerprint("anything");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_empty_input_hashes_empty_string() {
        // sha256("")
        let empty = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(exact_fingerprint(""), empty);
        assert_eq!(template_fingerprint("   "), empty);
    }

    #[test]
    fn test_template_keeps_keywords() {
        assert_eq!(template_normalize("if x > 10"), "if <VAR> > <NUM>");
        assert_eq!(
            template_normalize("SELECT name FROM users WHERE age > 3.5"),
            "select <VAR> <VAR> <VAR> where <VAR> > <NUM>"
        );
    }

    #[test]
    fn test_template_collapses_numbers_and_names() {
        let a = "What does total = 5 + 7 print?";
        let b = "What does count = 12 + 40 print?";
        assert_eq!(template_fingerprint(a), template_fingerprint(b));
        assert_ne!(exact_fingerprint(a), exact_fingerprint(b));
    }

    #[test]
    fn test_template_distinguishes_keywords() {
        assert_ne!(
            template_fingerprint("while x < 3"),
            template_fingerprint("if x < 3")
        );
    }
}
