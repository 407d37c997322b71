//! Grouped-number run segmentation.
//!
//! A run of digits and spaces from a statement table is ambiguous on its
//! own: "22 875 000" is one thousand-grouped value, "4 990 429 295 000" is
//! two, and "9 1330" is an OCR artifact for the pair "9133" / "0". This
//! module recovers the most plausible set of individual values from such a
//! run using a cost-minimizing segmentation over digit groups, guided by a
//! caller-supplied preferred value count (0 = no preference).
//!
//! Ahead of the general segmentation sits an ordered list of narrow repair
//! strategies for footnote-reference digits merged into value runs. They
//! are tuned to observed OCR failure patterns from scanned statements and
//! are deliberately kept in one table (`PAIR_REPAIRS`) so the family can
//! be audited, tested per strategy, and replaced for a new document source.

use lazy_static::lazy_static;
use regex::Regex;

use crate::lexer::{normalize_number_text, normalize_text};

lazy_static! {
    /// A signed digit run, possibly containing grouping spaces.
    static ref NUMBER_RUN: Regex = Regex::new(r"[+-]?\d[\d ]*").unwrap();
}

/// Strip a leading sign, if any.
fn unsigned(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn sign_of(s: &str) -> &str {
    if s.starts_with('-') {
        "-"
    } else if s.starts_with('+') {
        "+"
    } else {
        ""
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Signed integer token: optional sign, then digits.
fn is_signed_digits(s: &str) -> bool {
    is_digits(unsigned(s))
}

/// A 4-digit token starting "20" reads as a calendar year, not two merged
/// digit groups.
fn looks_like_year(digits: &str) -> bool {
    digits.len() == 4 && digits.starts_with("20") && is_digits(digits)
}

/// Split a token whose digits are two thousand-groups merged by lost
/// whitespace. Lengths 4-6 split at the historical group boundary; lengths
/// of 3 or less, recognized years, and anything non-numeric stay whole.
fn expand_merged_digit_token(token: &str) -> Vec<String> {
    let sign = sign_of(token);
    let d = unsigned(token);
    if !is_digits(d) || d.len() <= 3 {
        return vec![token.to_string()];
    }
    if looks_like_year(d) {
        return vec![token.to_string()];
    }
    match d.len() {
        4 => vec![format!("{sign}{}", &d[..3]), d[3..].to_string()],
        5 => vec![format!("{sign}{}", &d[..2]), d[2..].to_string()],
        6 => vec![format!("{sign}{}", &d[..3]), d[3..].to_string()],
        _ => vec![token.to_string()],
    }
}

/// A pair-repair strategy: given the expanded all-digit tokens of a run
/// expected to hold two column values, either reconstruct the values or
/// decline.
type PairRepair = fn(&[String]) -> Option<Vec<String>>;

/// Ordered repair strategies for footnote digits merged into value runs.
/// Tried in priority order before the general segmentation; first success
/// wins. Only consulted when the preferred count is 2 and every token is
/// an all-digit group of at most three digits.
pub(crate) const PAIR_REPAIRS: &[(&str, PairRepair)] = &[
    ("doubled-note-digit", repair_doubled_note_digit),
    ("leading-zero-pair", repair_leading_zero_pair),
    ("note-in-three-digit-group", repair_note_in_three_digit_group),
    ("doubled-lead-digit", repair_doubled_lead_digit),
    ("five-token-three-two", repair_five_token_three_two),
    ("zero-plus-grouped-tail", repair_zero_plus_grouped_tail),
];

fn is_group3(t: &str) -> bool {
    unsigned(t).len() == 3
}

fn is_lead(t: &str) -> bool {
    (1..=3).contains(&unsigned(t).len())
}

/// "4 4 990 429": a footnote digit duplicated the value's leading digit.
/// Collapse to the single value "4 990 429".
fn repair_doubled_note_digit(t: &[String]) -> Option<Vec<String>> {
    if t.len() == 4
        && unsigned(&t[0]).len() == 1
        && unsigned(&t[1]).len() == 1
        && unsigned(&t[0]) == unsigned(&t[1])
        && is_group3(&t[2])
        && is_group3(&t[3])
    {
        return Some(vec![format!("{} {} {}", t[1], t[2], t[3])]);
    }
    None
}

/// "04 965 842": a merged leading zero in the first group means a zero
/// value next to "4 965 842".
fn repair_leading_zero_pair(t: &[String]) -> Option<Vec<String>> {
    if t.len() == 3 && is_group3(&t[1]) && is_group3(&t[2]) {
        let first = unsigned(&t[0]);
        if first.len() == 2 && first.starts_with('0') {
            return Some(vec![
                "0".to_string(),
                format!("{} {} {}", &first[1..], t[1], t[2]),
            ]);
        }
    }
    None
}

/// "404 965 842": a footnote digit merged into a 3-digit first group.
/// The pattern digit-zero-digit reads as note "4", value "0", value
/// "4 965 842".
fn repair_note_in_three_digit_group(t: &[String]) -> Option<Vec<String>> {
    if t.len() == 3 && is_group3(&t[1]) && is_group3(&t[2]) {
        let g0 = unsigned(&t[0]);
        let b = g0.as_bytes();
        if g0.len() == 3 && (b'1'..=b'9').contains(&b[0]) && b[1] == b'0' {
            return Some(vec![
                "0".to_string(),
                format!("{} {} {}", &g0[2..], t[1], t[2]),
            ]);
        }
    }
    None
}

/// "44 990 429": a footnote digit duplicated onto the leading digit.
/// Collapse to "4 990 429".
fn repair_doubled_lead_digit(t: &[String]) -> Option<Vec<String>> {
    if t.len() == 3 && is_group3(&t[1]) && is_group3(&t[2]) {
        let g0 = unsigned(&t[0]);
        let b = g0.as_bytes();
        if g0.len() == 2 && b[0] == b[1] {
            return Some(vec![format!("{} {} {}", &g0[..1], t[1], t[2])]);
        }
    }
    None
}

/// Five groups with a short lead split 3+2, not 2+3: "4 990 429 295 000"
/// is "4 990 429" next to "295 000", never "4 990" next to "429 295 000".
fn repair_five_token_three_two(t: &[String]) -> Option<Vec<String>> {
    if t.len() == 5
        && is_lead(&t[0])
        && t[1..].iter().all(|g| is_group3(g))
    {
        return Some(vec![t[..3].join(" "), t[3..].join(" ")]);
    }
    None
}

/// "4 0 4 965 842": a footnote digit, a zero value, then a grouped value.
/// Keep the zero and the grouped tail.
fn repair_zero_plus_grouped_tail(t: &[String]) -> Option<Vec<String>> {
    if t.len() < 4 {
        return None;
    }
    let last3 = &t[t.len() - 3..];
    let tail_grouped = is_lead(&last3[0]) && is_group3(&last3[1]) && is_group3(&last3[2]);
    if !tail_grouped {
        return None;
    }
    let zero = t.iter().find(|x| unsigned(x) == "0")?;
    Some(vec![unsigned(zero).to_string(), last3.join(" ")])
}

/// Cost of one segment of `len` digit groups starting at `start`.
///
/// Encodes the domain priors as soft costs: values are usually two or
/// three groups, a lone group is suspicious, the first group of a value
/// is short, trailing groups are exactly three digits, and leading-zero
/// groups rarely start a genuine value.
fn segment_cost(tokens: &[String], start: usize, len: usize) -> f64 {
    let mut cost = match len {
        1 => 1.2,
        2 => 0.0,
        3 => 0.1,
        4 => 0.6,
        n => 2.0 + (n as f64 - 4.0) * 1.5,
    };

    let first = unsigned(&tokens[start]);
    if !(is_digits(first) && (1..=3).contains(&first.len())) {
        cost += 4.0;
    }
    if (first.len() >= 2 && first.starts_with('0') && is_digits(first)) || first == "000" {
        cost += 2.0;
    }

    for part in &tokens[start + 1..start + len] {
        if !(unsigned(part).len() == 3 && is_digits(unsigned(part))) {
            cost += 4.0;
        }
    }

    cost
}

#[derive(Clone, Copy)]
struct DpCell {
    cost: f64,
    parts: usize,
    prev: usize,
}

/// Minimum-cost partition of the token sequence into contiguous groups of
/// one to four tokens, with a soft penalty for deviating from the
/// preferred part count. Returns the group boundaries, or `None` when no
/// partition exists.
fn best_partition(tokens: &[String], preferred_count: usize) -> Option<Vec<(usize, usize)>> {
    let n = tokens.len();
    let mut dp: Vec<Option<DpCell>> = vec![None; n + 1];
    dp[0] = Some(DpCell {
        cost: 0.0,
        parts: 0,
        prev: 0,
    });

    for i in 0..n {
        let cur = match dp[i] {
            Some(c) => c,
            None => continue,
        };
        // Length order matters for exact ties: prefer 2, then 3, 1, 4.
        for len in [2usize, 3, 1, 4] {
            let j = i + len;
            if j > n {
                continue;
            }
            let next_parts = cur.parts + 1;
            let mut next_cost = cur.cost + segment_cost(tokens, i, len);
            if preferred_count > 0 {
                next_cost += (next_parts as f64 - preferred_count as f64).abs() * 0.15;
            }
            let better = match dp[j] {
                None => true,
                Some(c) => next_cost < c.cost,
            };
            if better {
                dp[j] = Some(DpCell {
                    cost: next_cost,
                    parts: next_parts,
                    prev: i,
                });
            }
        }
    }

    let end = dp[n]?;
    if end.parts == 0 {
        return None;
    }
    let mut bounds = Vec::with_capacity(end.parts);
    let mut j = n;
    while j > 0 {
        let cell = dp[j]?;
        bounds.push((cell.prev, j));
        j = cell.prev;
    }
    bounds.reverse();
    Some(bounds)
}

/// Split an ambiguous digit-and-space run into the most plausible set of
/// grouped numbers.
///
/// `preferred_count` is the expected number of values (typically 2 for a
/// two-year comparison statement); 0 means no preference, in which case
/// merged-digit expansion is skipped and only minimal normalization and
/// grouping happen. The function never fails: a run it cannot segment
/// comes back unchanged as a single value, and non-empty input never
/// yields an empty result.
pub fn split_grouped_run(run: &str, preferred_count: usize) -> Vec<String> {
    let cleaned = normalize_text(run);
    if cleaned.is_empty() {
        return vec![];
    }
    let tokens: Vec<String> = cleaned.split(' ').map(str::to_string).collect();
    if tokens.len() == 1 {
        return vec![cleaned];
    }

    // OCR repair for 2-column value pairs occasionally extracted as
    // "9 1330" (intended: "9133" and "0").
    if preferred_count == 2 && tokens.len() == 2 {
        let a = unsigned(&tokens[0]);
        let b = unsigned(&tokens[1]);
        if is_digits(a)
            && (1..=3).contains(&a.len())
            && is_digits(b)
            && (4..=6).contains(&b.len())
        {
            let left = format!("{a}{}", &b[..3]);
            let right = b[3..].to_string();
            if !left.is_empty() && !right.is_empty() {
                return vec![left, right];
            }
        }
    }

    let mut working: Vec<String> = Vec::with_capacity(tokens.len());
    for token in &tokens {
        if preferred_count > 0 {
            working.extend(
                expand_merged_digit_token(token)
                    .into_iter()
                    .filter(|p| !p.is_empty()),
            );
        } else if !token.is_empty() {
            working.push(token.clone());
        }
    }
    if working.is_empty() {
        return vec![];
    }

    // Mixed content: segmentation is unsafe, hand the run back whole.
    if working.iter().any(|t| !is_signed_digits(t)) {
        return vec![cleaned];
    }
    // Tokens longer than a thousand-group are already full values.
    if working.iter().any(|t| unsigned(t).len() > 3) {
        return working;
    }

    if preferred_count == 2 {
        for (name, repair) in PAIR_REPAIRS {
            if let Some(values) = repair(&working) {
                log::trace!("pair repair '{name}' applied to run '{cleaned}'");
                return values;
            }
        }
    }

    match best_partition(&working, preferred_count) {
        Some(bounds) => bounds
            .iter()
            .map(|&(a, b)| working[a..b].join(" "))
            .collect(),
        None => vec![cleaned],
    }
}

/// Extract every numeric value from a line of text.
///
/// Thousands punctuation is normalized away, Unicode minus and dash
/// variants become ASCII minus, then each maximal signed digit-and-space
/// run is segmented via [`split_grouped_run`].
pub fn extract_numbers(text: &str, preferred_count: usize) -> Vec<String> {
    let s = normalize_number_text(text)
        .replace(['\u{2212}', '\u{2013}', '\u{2014}'], "-");
    let mut out = Vec::new();
    for m in NUMBER_RUN.find_iter(&s) {
        let run = normalize_text(m.as_str());
        if run.is_empty() {
            continue;
        }
        for part in split_grouped_run(&run, preferred_count) {
            let v = normalize_text(&part);
            if !v.is_empty() {
                out.push(v);
            }
        }
    }
    out
}

/// Repair table values that arrived merged into fewer cells than the
/// expected column count.
///
/// Each cell is re-segmented; the flattened result is accepted only when
/// it lands exactly on `expected_count`, otherwise the original cells are
/// returned untouched.
pub fn normalize_value_cells(values: &[String], expected_count: usize) -> Vec<String> {
    let cells: Vec<String> = values.iter().map(|v| normalize_text(v)).collect();
    if cells.is_empty() {
        return vec![];
    }
    if expected_count == 0 || cells.len() >= expected_count {
        return cells;
    }

    let mut flattened = Vec::new();
    for cell in &cells {
        let split = extract_numbers(cell, expected_count);
        if split.len() > 1 {
            flattened.extend(split);
        } else {
            flattened.push(cell.clone());
        }
    }

    if flattened.len() == expected_count {
        flattened
    } else {
        cells
    }
}
