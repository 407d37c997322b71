//! Keyword-line matching over clustered rows and raw text.
//!
//! A streaming scan: rows/lines are tested in document order against every
//! matcher, values are extracted per hit, and per-key and total quotas stop
//! the scan early. Nothing is materialized beyond the output list, which
//! bounds memory on large documents.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::layout::{cluster_rows, resolve_columns, Row};
use crate::lexer::{is_numeric_token, normalize_text};
use crate::matcher::{MatchedLine, Matcher, ScanOptions, Source};
use crate::segment::extract_numbers;
use crate::token::Token;

lazy_static! {
    /// A signed digit-and-space run, for stripping numbers out of a line.
    static ref NUMBER_RUN: Regex = Regex::new(r"[+-]?\d[\d ]*").unwrap();
}

/// Collapse an exact doubled repetition of a phrase, an OCR duplication
/// artifact ("Kortfristiga fordringarKortfristiga fordringar"). Only
/// phrases of at least four characters are considered.
fn collapse_doubled_phrase(s: &str) -> &str {
    let n = s.len();
    if n < 8 || n % 2 != 0 || !s.is_char_boundary(n / 2) {
        return s;
    }
    let (a, b) = s.split_at(n / 2);
    if a == b && a.chars().count() >= 4 {
        a.trim()
    } else {
        s
    }
}

/// The label of a text line: numeric runs removed, dangling punctuation
/// trimmed, doubled phrases collapsed.
pub fn strip_numbers_from_line(line: &str) -> String {
    let s = line
        .replace('\u{a0}', " ")
        .replace(['\u{2212}', '\u{2013}', '\u{2014}'], "-");
    let s = normalize_text(&NUMBER_RUN.replace_all(&s, " "));
    let cleaned = s.trim_end_matches([',', ':', ';', '-']).trim();
    collapse_doubled_phrase(cleaned).to_string()
}

/// The label of a row: non-numeric tokens joined, doubled phrases
/// collapsed.
fn row_label(row: &Row) -> String {
    let joined = row
        .tokens
        .iter()
        .filter(|t| !is_numeric_token(&t.text))
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let cleaned = normalize_text(&joined);
    collapse_doubled_phrase(&cleaned).to_string()
}

/// Streaming keyword-line scanner.
///
/// Feed pages of tokens (layout pipeline) or lines of text (text
/// pipeline); matched lines accumulate under the configured quotas with
/// exact-repeat deduplication on `(key, label, values)`. The scanner holds
/// no state between documents — build one per document scan.
pub struct LineScanner<'a> {
    matchers: &'a [Matcher],
    options: ScanOptions,
    out: Vec<MatchedLine>,
    counts: HashMap<String, usize>,
    seen: HashSet<String>,
    line_index: usize,
}

impl<'a> LineScanner<'a> {
    /// Create a scanner for one document.
    pub fn new(matchers: &'a [Matcher], options: ScanOptions) -> Self {
        LineScanner {
            matchers,
            options,
            out: Vec::new(),
            counts: HashMap::new(),
            seen: HashSet::new(),
            line_index: 0,
        }
    }

    /// True once the total quota is reached; further input is ignored.
    pub fn is_full(&self) -> bool {
        self.out.len() >= self.options.max_total_lines
    }

    /// Cluster one page of tokens into rows and scan them (layout
    /// pipeline).
    pub fn scan_page(&mut self, tokens: &[Token]) {
        if self.is_full() {
            return;
        }
        for row in cluster_rows(tokens) {
            self.line_index += 1;
            if row.text.is_empty() {
                continue;
            }
            if self.is_full() {
                return;
            }
            let preferred = self.options.preferred_count;
            let label = {
                let l = row_label(&row);
                if l.is_empty() {
                    row.text.clone()
                } else {
                    l
                }
            };
            let text = row.text.clone();
            self.scan_one(&text, label, Source::PdfXy, || {
                resolve_columns(&row.tokens, preferred)
            });
        }
    }

    /// Scan raw linearized text line by line (text pipeline).
    pub fn scan_text(&mut self, text: &str) {
        let normalized = text.replace('\0', " ").replace("\r\n", "\n").replace('\r', "\n");
        for raw in normalized.split('\n') {
            let line = normalize_text(raw);
            if line.is_empty() {
                continue;
            }
            self.line_index += 1;
            if self.is_full() {
                return;
            }
            let preferred = self.options.preferred_count;
            let label = {
                let l = strip_numbers_from_line(&line);
                if l.is_empty() {
                    line.clone()
                } else {
                    l
                }
            };
            self.scan_one(&line, label, Source::PdfText, || {
                extract_numbers(&line, preferred)
            });
        }
    }

    /// Test one row/line against every matcher and record hits under the
    /// quotas. Values are computed lazily, once, on the first matcher hit.
    fn scan_one<F>(&mut self, text: &str, label: String, source: Source, mut values_fn: F)
    where
        F: FnMut() -> Vec<String>,
    {
        let mut values: Option<Vec<String>> = None;
        for m in self.matchers {
            if m.key.is_empty() || !m.pattern.is_match(text) {
                continue;
            }
            let count = self.counts.get(&m.key).copied().unwrap_or(0);
            if count >= self.options.max_lines_per_key {
                continue;
            }

            let values = values.get_or_insert_with(&mut values_fn).clone();
            let dedupe_key = format!("{}|{}|{}", m.key, label, values.join("|"));
            if self.seen.contains(&dedupe_key) {
                continue;
            }

            self.out.push(MatchedLine {
                key: m.key.clone(),
                line: label.clone(),
                line_index: self.line_index,
                values,
                source,
            });
            self.seen.insert(dedupe_key);
            self.counts.insert(m.key.clone(), count + 1);

            if self.is_full() {
                log::debug!("total line quota reached at line {}", self.line_index);
                return;
            }
        }
    }

    /// Consume the scanner, yielding the matched lines in document order.
    pub fn into_lines(self) -> Vec<MatchedLine> {
        self.out
    }
}

/// Scan a document supplied as pages of positioned tokens (layout
/// pipeline). At most `options.max_pages` pages are consumed; the scan
/// stops early once the total quota is reached.
pub fn extract_matched_lines_from_pages(
    pages: &[Vec<Token>],
    matchers: &[Matcher],
    options: &ScanOptions,
) -> Vec<MatchedLine> {
    if matchers.is_empty() {
        return vec![];
    }
    let mut scanner = LineScanner::new(matchers, options.clone());
    for page in pages.iter().take(options.max_pages.max(1)) {
        if scanner.is_full() {
            break;
        }
        scanner.scan_page(page);
    }
    scanner.into_lines()
}

/// Scan a document supplied as raw linearized text (text pipeline).
pub fn extract_matched_lines_from_text(
    text: &str,
    matchers: &[Matcher],
    options: &ScanOptions,
) -> Vec<MatchedLine> {
    if matchers.is_empty() {
        return vec![];
    }
    let mut scanner = LineScanner::new(matchers, options.clone());
    scanner.scan_text(text);
    scanner.into_lines()
}
