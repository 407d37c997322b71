//! Keyword matchers, scan options, and the matched-line output model.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `{key, pattern}` pair identifying relevant table rows or text lines.
///
/// The pattern is case-insensitive and applied to every row/line of a
/// document. A fixed matcher set is supplied by the caller and reused
/// across documents.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Key under which matched lines are reported (e.g. "Kreditinstitut")
    pub key: String,
    /// Compiled case-insensitive pattern
    pub pattern: Regex,
}

impl Matcher {
    /// Build a matcher from a literal keyword: the keyword is
    /// regex-escaped and matched case-insensitively anywhere in a line.
    pub fn from_keyword(keyword: &str) -> Result<Self> {
        Self::from_pattern(keyword, &regex::escape(keyword.trim()))
    }

    /// Build a matcher from a raw regex pattern, compiled
    /// case-insensitively.
    pub fn from_pattern(key: &str, pattern: &str) -> Result<Self> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                key: key.to_string(),
                source,
            })?;
        Ok(Matcher {
            key: key.trim().to_string(),
            pattern: compiled,
        })
    }

    /// Build matchers from a list of literal keywords, skipping blanks.
    pub fn from_keywords<I, S>(keywords: I) -> Result<Vec<Matcher>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keywords
            .into_iter()
            .filter(|k| !k.as_ref().trim().is_empty())
            .map(|k| Matcher::from_keyword(k.as_ref()))
            .collect()
    }
}

/// Which extraction pipeline produced a matched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Layout pipeline: token coordinates, row/column clustering
    #[serde(rename = "PDF_XY")]
    PdfXy,
    /// Text pipeline: linearized plain text
    #[serde(rename = "PDF_TEXT")]
    PdfText,
    /// Values recovered from an HTML fallback collaborator
    #[serde(rename = "HTML_FALLBACK")]
    HtmlFallback,
}

/// A matched, value-annotated line.
///
/// `values` holds the reconstructed digit-group literals left-to-right as
/// found. After coercion toward a preferred count the sequence either has
/// exactly that count or is the best-effort raw extraction — consumers
/// must not assume a fixed arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedLine {
    /// Matcher key that hit
    pub key: String,
    /// Label text with numeric tokens stripped
    pub line: String,
    /// 1-based index of the source row/line within the document scan
    pub line_index: usize,
    /// Reconstructed numeric values, left to right
    pub values: Vec<String>,
    /// Producing pipeline
    pub source: Source,
}

/// Quotas and preferences for a document scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum matched lines reported per matcher key
    pub max_lines_per_key: usize,
    /// Maximum matched lines reported per scan
    pub max_total_lines: usize,
    /// Expected number of value columns (0 = no preference)
    pub preferred_count: usize,
    /// Maximum pages consumed from a page sequence
    pub max_pages: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            max_lines_per_key: 10,
            max_total_lines: 60,
            preferred_count: 2,
            max_pages: 12,
        }
    }
}

impl ScanOptions {
    /// Create default scan options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-key line quota.
    pub fn with_max_lines_per_key(mut self, value: usize) -> Self {
        self.max_lines_per_key = value;
        self
    }

    /// Set the total line quota.
    pub fn with_max_total_lines(mut self, value: usize) -> Self {
        self.max_total_lines = value;
        self
    }

    /// Set the preferred value-column count.
    pub fn with_preferred_count(mut self, value: usize) -> Self {
        self.preferred_count = value;
        self
    }

    /// Set the page limit.
    pub fn with_max_pages(mut self, value: usize) -> Self {
        self.max_pages = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword_escapes_and_ignores_case() {
        let m = Matcher::from_keyword("Capital Box").unwrap();
        assert!(m.pattern.is_match("skulder till CAPITAL BOX AB"));
        assert!(!m.pattern.is_match("CapitalBox"));

        // metacharacters in keywords are literal
        let m = Matcher::from_keyword("OPR (leasing)").unwrap();
        assert!(m.pattern.is_match("via opr (leasing) 2023"));
    }

    #[test]
    fn test_from_keywords_skips_blanks() {
        let ms = Matcher::from_keywords(["Qred", "  ", "Svea"]).unwrap();
        let keys: Vec<&str> = ms.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["Qred", "Svea"]);
    }

    #[test]
    fn test_from_pattern_rejects_invalid() {
        let err = Matcher::from_pattern("bad", "(").unwrap_err();
        assert!(format!("{err}").contains("bad"));
    }

    #[test]
    fn test_options_defaults_and_builders() {
        let opts = ScanOptions::new();
        assert_eq!(opts.max_lines_per_key, 10);
        assert_eq!(opts.max_total_lines, 60);
        assert_eq!(opts.preferred_count, 2);
        assert_eq!(opts.max_pages, 12);

        let opts = ScanOptions::new().with_max_total_lines(5).with_preferred_count(1);
        assert_eq!(opts.max_total_lines, 5);
        assert_eq!(opts.preferred_count, 1);
    }

    #[test]
    fn test_matched_line_serializes_with_wire_source_names() {
        let line = MatchedLine {
            key: "Kreditinstitut".to_string(),
            line: "Skulder till kreditinstitut".to_string(),
            line_index: 12,
            values: vec!["112 500".to_string(), "87 250".to_string()],
            source: Source::PdfXy,
        };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"PDF_XY\""));
        assert!(json.contains("\"line_index\":12"));
    }
}
