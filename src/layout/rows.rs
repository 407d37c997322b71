//! Vertical row clustering.
//!
//! Statement pages arrive as a loose bag of positioned fragments; this
//! module recovers which fragments belong to the same visual row. It is a
//! single-pass nearest-cluster assignment rather than a global clustering:
//! real statement pages have well-separated row bands, so stability and
//! O(n·rows) cost win over optimality.

use crate::lexer::normalize_text;
use crate::token::Token;

/// A vertically-clustered group of tokens representing one visual line.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Representative vertical position: mean of member tokens' y
    pub y: f64,
    /// Member tokens, x-ascending
    pub tokens: Vec<Token>,
    /// Display text: member texts joined with single spaces, left to right
    pub text: String,
}

struct RowBuilder {
    y_sum: f64,
    tokens: Vec<Token>,
}

impl RowBuilder {
    fn mean_y(&self) -> f64 {
        self.y_sum / self.tokens.len() as f64
    }
}

/// Cluster a page's tokens into rows, top of page first.
///
/// Tokens are walked in descending-y order; each joins the nearest
/// existing row whose representative y is within a tolerance derived from
/// the median token height (clamped to [2.5, 10] layout units), or starts
/// a new row. A stray token far from everything produces its own row.
/// Tokens with non-finite or non-positive height still cluster; they are
/// only excluded from the median-height computation.
pub fn cluster_rows(tokens: &[Token]) -> Vec<Row> {
    if tokens.is_empty() {
        return vec![];
    }

    let mut sorted: Vec<&Token> = tokens.iter().collect();
    sorted.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut heights: Vec<f64> = sorted
        .iter()
        .map(|t| t.h)
        .filter(|h| h.is_finite() && *h > 0.0)
        .collect();
    heights.sort_by(f64::total_cmp);
    let median_h = if heights.is_empty() {
        8.0
    } else {
        heights[heights.len() / 2]
    };
    let y_tol = (median_h * 0.6).clamp(2.5, 10.0);

    let mut rows: Vec<RowBuilder> = Vec::new();
    for t in sorted {
        let mut best: Option<usize> = None;
        let mut best_dy = f64::INFINITY;
        for (i, r) in rows.iter().enumerate() {
            let dy = (r.mean_y() - t.y).abs();
            if dy <= y_tol && dy < best_dy {
                best = Some(i);
                best_dy = dy;
            }
        }
        match best {
            Some(i) => {
                rows[i].y_sum += t.y;
                rows[i].tokens.push(t.clone());
            }
            None => rows.push(RowBuilder {
                y_sum: t.y,
                tokens: vec![t.clone()],
            }),
        }
    }

    let mut out: Vec<Row> = rows
        .into_iter()
        .map(|r| {
            let y = r.mean_y();
            let mut tokens = r.tokens;
            tokens.sort_by(|a, b| a.x.total_cmp(&b.x));
            let text = normalize_text(
                &tokens
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            Row { y, tokens, text }
        })
        .collect();
    out.sort_by(|a, b| b.y.total_cmp(&a.y));

    log::debug!("clustered {} tokens into {} rows (y_tol={y_tol:.2})", tokens.len(), out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, x: f64, y: f64) -> Token {
        Token::new(text, x, y, text.len() as f64 * 4.0, 8.0).unwrap()
    }

    #[test]
    fn test_empty_page() {
        assert!(cluster_rows(&[]).is_empty());
    }

    #[test]
    fn test_single_stray_token_forms_own_row() {
        let rows = cluster_rows(&[tok("Summa", 10.0, 500.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "Summa");
        assert_eq!(rows[0].y, 500.0);
    }

    #[test]
    fn test_tokens_on_same_band_join_one_row() {
        let rows = cluster_rows(&[
            tok("Skulder", 10.0, 500.0),
            tok("112 500", 200.0, 501.5),
            tok("87 250", 300.0, 499.0),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "Skulder 112 500 87 250");
    }

    #[test]
    fn test_rows_ordered_top_to_bottom() {
        let rows = cluster_rows(&[
            tok("bottom", 10.0, 100.0),
            tok("top", 10.0, 700.0),
            tok("middle", 10.0, 400.0),
        ]);
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["top", "middle", "bottom"]);
    }

    #[test]
    fn test_row_tokens_sorted_by_x() {
        let rows = cluster_rows(&[
            tok("87 250", 300.0, 500.0),
            tok("Skulder", 10.0, 500.0),
            tok("112 500", 200.0, 500.0),
        ]);
        assert_eq!(rows.len(), 1);
        let xs: Vec<f64> = rows[0].tokens.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![10.0, 200.0, 300.0]);
        assert_eq!(rows[0].text, "Skulder 112 500 87 250");
    }

    #[test]
    fn test_representative_y_is_running_mean() {
        let rows = cluster_rows(&[
            tok("a", 10.0, 500.0),
            tok("b", 20.0, 502.0),
            tok("c", 30.0, 498.0),
        ]);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_height_does_not_poison_median() {
        let mut t = tok("a", 10.0, 500.0);
        t.h = f64::NAN;
        let rows = cluster_rows(&[t, tok("b", 20.0, 501.0)]);
        // median falls back to the finite height; both tokens still cluster
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let tokens = vec![
            tok("Skulder", 10.0, 500.0),
            tok("112 500", 200.0, 501.0),
            tok("Summa", 10.0, 480.0),
            tok("87 250", 300.0, 499.0),
            tok("22 875", 200.0, 479.5),
        ];
        let a = cluster_rows(&tokens);
        let b = cluster_rows(&tokens);
        assert_eq!(a, b);
    }
}
