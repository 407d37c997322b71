//! Reporting-boundary normalizers.
//!
//! Downstream consumers pivot matched lines into per-year reports; these
//! helpers turn extracted value strings and header lines into typed facts.
//! All of them follow the same contract as the extraction core: malformed
//! input yields "no value", never an error.

use lazy_static::lazy_static;
use regex::Regex;

use crate::lexer::normalize_text;

/// Values whose magnitude exceeds this are treated as extraction noise.
pub const DEFAULT_SANITY_LIMIT: i64 = 5_000_000_000;

lazy_static! {
    /// A thousand-grouped money run: 1-3 digits, then 3-digit groups.
    static ref MONEY_GROUP: Regex = Regex::new(r"-?\d{1,3}(?: \d{3})+").unwrap();
    /// A plausible statement year.
    static ref YEAR: Regex = Regex::new(r"\b(20[0-3]\d)\b").unwrap();
}

/// Parse a money string ("22 875 000", "-1 234") to an integer.
///
/// Everything but digits, spaces, and minus is stripped, the grouping
/// spaces removed, and the rest parsed strictly: residual garbage and
/// magnitudes above `limit` both yield `None`.
pub fn parse_money_to_int_with_limit(raw: &str, limit: i64) -> Option<i64> {
    let s: String = normalize_text(raw)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();
    let compact: String = s.chars().filter(|c| *c != ' ').collect();
    if compact.is_empty() {
        return None;
    }
    let v: i64 = compact.parse().ok()?;
    if v.abs() > limit {
        return None;
    }
    Some(v)
}

/// [`parse_money_to_int_with_limit`] with the default sanity limit.
pub fn parse_money_to_int(raw: &str) -> Option<i64> {
    parse_money_to_int_with_limit(raw, DEFAULT_SANITY_LIMIT)
}

/// Parse every thousand-grouped money run in a line.
pub fn extract_money_groups(line: &str) -> Vec<i64> {
    let s = normalize_text(line);
    MONEY_GROUP
        .find_iter(&s)
        .filter_map(|m| parse_money_to_int(m.as_str()))
        .collect()
}

/// Distinct statement years found in a header line, in order of first
/// appearance. A usable year context needs at least two columns, so fewer
/// than two distinct years yields `None`.
pub fn extract_header_years(text: &str) -> Option<Vec<i32>> {
    let s = normalize_text(text);
    let mut years: Vec<i32> = Vec::new();
    for cap in YEAR.captures_iter(&s) {
        if let Ok(y) = cap[1].parse::<i32>() {
            if !years.contains(&y) {
                years.push(y);
            }
        }
    }
    if years.len() >= 2 {
        Some(years)
    } else {
        None
    }
}

/// A canonical-label rule: the first rule whose pattern matches a raw
/// (lowercased) label decides its canonical form.
#[derive(Debug, Clone)]
pub struct LabelRule {
    /// Pattern tested against the lowercased raw label
    pub pattern: Regex,
    /// Canonical label to report
    pub label: String,
}

impl LabelRule {
    /// Build a rule from a pattern and canonical label.
    pub fn new(pattern: &str, label: &str) -> crate::error::Result<Self> {
        let compiled = regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| crate::error::Error::InvalidPattern {
                key: label.to_string(),
                source,
            })?;
        Ok(LabelRule {
            pattern: compiled,
            label: label.to_string(),
        })
    }
}

/// Map a raw label to its canonical form via the first matching rule.
pub fn normalize_label<'a>(raw: &str, rules: &'a [LabelRule]) -> Option<&'a str> {
    let s = normalize_text(raw).to_lowercase();
    rules
        .iter()
        .find(|r| r.pattern.is_match(&s))
        .map(|r| r.label.as_str())
}

/// One labelled fact with per-year values, parsed from a statement line.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFact {
    /// Canonical label
    pub label: String,
    /// The normalized source line
    pub raw_line: String,
    /// (year, value) pairs, in the header's year order
    pub data: Vec<(i32, i64)>,
}

/// Parse one text line into a statement fact, given the header's year
/// context and the caller's label rules.
///
/// The line must map to a canonical label and carry grouped money values.
/// When extraction found more values than years (stray footnote numbers
/// to the left), the trailing `years.len()` values are taken; any other
/// arity mismatch yields `None`.
pub fn parse_statement_line(
    line: &str,
    years: &[i32],
    rules: &[LabelRule],
) -> Option<StatementFact> {
    let raw = normalize_text(line);
    if raw.is_empty() || years.len() < 2 {
        return None;
    }
    let label = normalize_label(&raw, rules)?;

    let values = extract_money_groups(&raw);
    if values.is_empty() {
        return None;
    }
    let mapped: &[i64] = if values.len() > years.len() {
        &values[values.len() - years.len()..]
    } else {
        &values
    };
    if mapped.len() != years.len() {
        return None;
    }

    Some(StatementFact {
        label: label.to_string(),
        raw_line: raw,
        data: years.iter().copied().zip(mapped.iter().copied()).collect(),
    })
}
