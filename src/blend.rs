//! Dual-source blending of layout-pipeline and text-pipeline results.
//!
//! The layout pipeline is generally the more precise of the two, but it
//! can miss pages where token position data is unavailable. Blending
//! salvages text-pipeline lines for those gaps while keeping the layout
//! entry whenever both sides extracted comparably.

use indexmap::IndexMap;

use crate::matcher::MatchedLine;

/// Value richness clamped at two, since two-column comparison statements
/// are the common case; a third value rarely signals a better extraction.
fn richness(line: &MatchedLine) -> usize {
    line.values.len().min(2)
}

/// Merge two matched-line lists for the same document.
///
/// Entries are grouped per key in first-appearance order (layout keys
/// first) and walked pairwise by position. Where only one side has an
/// entry it is kept; where both do, the one with more populated values
/// wins, the layout entry taking exact ties.
pub fn blend_matched_lines(layout: &[MatchedLine], text: &[MatchedLine]) -> Vec<MatchedLine> {
    if layout.is_empty() {
        return text.to_vec();
    }
    if text.is_empty() {
        return layout.to_vec();
    }

    let group = |lines: &[MatchedLine]| {
        let mut map: IndexMap<String, Vec<MatchedLine>> = IndexMap::new();
        for line in lines {
            map.entry(line.key.clone()).or_default().push(line.clone());
        }
        map
    };

    let layout_map = group(layout);
    let text_map = group(text);

    let mut keys: Vec<String> = layout_map.keys().cloned().collect();
    for key in text_map.keys() {
        if !layout_map.contains_key(key) {
            keys.push(key.clone());
        }
    }

    let empty: Vec<MatchedLine> = Vec::new();
    let mut out = Vec::new();
    for key in &keys {
        let from_layout = layout_map.get(key).unwrap_or(&empty);
        let from_text = text_map.get(key).unwrap_or(&empty);
        let n = from_layout.len().max(from_text.len());
        for i in 0..n {
            match (from_layout.get(i), from_text.get(i)) {
                (Some(l), None) => out.push(l.clone()),
                (None, Some(t)) => out.push(t.clone()),
                (Some(l), Some(t)) => {
                    out.push(if richness(l) >= richness(t) { l.clone() } else { t.clone() })
                }
                (None, None) => {}
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Source;

    fn line(key: &str, label: &str, values: &[&str], source: Source) -> MatchedLine {
        MatchedLine {
            key: key.to_string(),
            line: label.to_string(),
            line_index: 1,
            values: values.iter().map(|s| s.to_string()).collect(),
            source,
        }
    }

    #[test]
    fn test_one_empty_side_passes_through() {
        let l = vec![line("K", "a", &["1"], Source::PdfXy)];
        assert_eq!(blend_matched_lines(&l, &[]), l);
        assert_eq!(blend_matched_lines(&[], &l), l);
    }

    #[test]
    fn test_layout_wins_ties() {
        let l = vec![line("K", "a", &["1", "2"], Source::PdfXy)];
        let t = vec![line("K", "a", &["1", "2"], Source::PdfText)];
        let blended = blend_matched_lines(&l, &t);
        assert_eq!(blended.len(), 1);
        assert_eq!(blended[0].source, Source::PdfXy);
    }

    #[test]
    fn test_richer_text_entry_wins() {
        let l = vec![line("K", "a", &["1"], Source::PdfXy)];
        let t = vec![line("K", "a", &["1", "2"], Source::PdfText)];
        let blended = blend_matched_lines(&l, &t);
        assert_eq!(blended[0].source, Source::PdfText);
    }

    #[test]
    fn test_richness_clamped_at_two() {
        // three values are not richer than two
        let l = vec![line("K", "a", &["1", "2"], Source::PdfXy)];
        let t = vec![line("K", "a", &["1", "2", "3"], Source::PdfText)];
        let blended = blend_matched_lines(&l, &t);
        assert_eq!(blended[0].source, Source::PdfXy);
    }

    #[test]
    fn test_positions_missing_on_one_side_are_kept() {
        let l = vec![line("K", "a", &["1", "2"], Source::PdfXy)];
        let t = vec![
            line("K", "a", &["1"], Source::PdfText),
            line("K", "b", &["3", "4"], Source::PdfText),
        ];
        let blended = blend_matched_lines(&l, &t);
        assert_eq!(blended.len(), 2);
        assert_eq!(blended[0].source, Source::PdfXy);
        assert_eq!(blended[1].line, "b");
    }

    #[test]
    fn test_text_only_keys_appended_after_layout_keys() {
        let l = vec![line("K", "a", &["1", "2"], Source::PdfXy)];
        let t = vec![
            line("L", "x", &["5"], Source::PdfText),
            line("K", "a", &[], Source::PdfText),
        ];
        let blended = blend_matched_lines(&l, &t);
        let keys: Vec<&str> = blended.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["K", "L"]);
    }

    #[test]
    fn test_blend_with_self_is_identity() {
        let l = vec![
            line("K", "a", &["1", "2"], Source::PdfXy),
            line("K", "b", &["3"], Source::PdfXy),
            line("L", "c", &[], Source::PdfXy),
        ];
        assert_eq!(blend_matched_lines(&l, &l), l);
    }
}
