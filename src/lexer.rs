//! Numeric token classification and separator normalization.
//!
//! Statement PDFs mix thousand-separator styles: Scandinavian statements
//! group digits with spaces ("22 875 000"), while some extractions emit
//! periods or commas. The lexer normalizes fragments so downstream
//! segmentation only ever sees space-grouped digit runs. It never fails;
//! unparsable input comes back unchanged or empty.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Grammar for a numeric-looking fragment: optional sign, a digit,
    /// then digits and separator punctuation.
    static ref NUMERIC_TOKEN: Regex = Regex::new(r"^[+\-]?\d[\d .,:\-]*$").unwrap();
}

/// Normalize a raw text fragment: non-breaking spaces become ordinary
/// spaces, internal whitespace runs collapse to one space, ends trimmed.
pub fn normalize_text(s: &str) -> String {
    s.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True iff the normalized fragment contains at least one digit and
/// matches the numeric-token grammar (sign, digits, separator punctuation).
pub fn is_numeric_token(s: &str) -> bool {
    let t = normalize_text(s);
    if t.is_empty() || !t.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    NUMERIC_TOKEN.is_match(&t)
}

/// Strip thousand-separator periods and commas, keeping decimal
/// separators intact.
///
/// A `.` or `,` is treated as a thousands separator only when followed by
/// exactly three digits and then a non-digit or end of string; anything
/// else (e.g. "3,5") is left alone. Separators become spaces so the result
/// is a uniform space-grouped run.
pub fn normalize_number_text(s: &str) -> String {
    let t = normalize_text(s);
    let chars: Vec<char> = t.chars().collect();
    let mut out = String::with_capacity(t.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '.' || c == ',' {
            let three_digits = chars[i + 1..]
                .iter()
                .take(3)
                .filter(|c| c.is_ascii_digit())
                .count()
                == 3;
            let boundary_after = chars
                .get(i + 4)
                .map_or(true, |c| !c.is_ascii_digit());
            if three_digits && boundary_after {
                out.push(' ');
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    normalize_text(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  a\u{a0} b\t c "), "a b c");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_is_numeric_token() {
        assert!(is_numeric_token("22 875 000"));
        assert!(is_numeric_token("-1 234"));
        assert!(is_numeric_token("+9"));
        assert!(is_numeric_token("2023:1"));
        assert!(is_numeric_token("1.234,5"));
        assert!(!is_numeric_token("Kreditinstitut"));
        assert!(!is_numeric_token("Not 123")); // digit not first
        assert!(!is_numeric_token("-"));
        assert!(!is_numeric_token(""));
    }

    #[test]
    fn test_normalize_number_text_strips_thousands_punctuation() {
        assert_eq!(normalize_number_text("1.234.567"), "1 234 567");
        assert_eq!(normalize_number_text("22,875,000"), "22 875 000");
    }

    #[test]
    fn test_normalize_number_text_keeps_decimal_separator() {
        // only two digits after the comma: decimal, not thousands
        assert_eq!(normalize_number_text("3,50"), "3,50");
        // four digits after the period: not a grouping boundary
        assert_eq!(normalize_number_text("1.2345"), "1.2345");
    }

    #[test]
    fn test_normalize_number_text_never_fails_on_garbage() {
        assert_eq!(normalize_number_text("abc"), "abc");
        assert_eq!(normalize_number_text(""), "");
        assert_eq!(normalize_number_text(",,,"), ",,,");
    }
}
