//! Positioned text fragments.
//!
//! A [`Token`] is a single text fragment as emitted by a PDF text layer:
//! the string plus its position and size on the page. Tokens are produced
//! once per page by an external text-extraction collaborator and owned by
//! the page-processing call; they are never shared across pages.

use crate::lexer::normalize_text;

/// A single positioned text fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Fragment text, whitespace-normalized
    pub text: String,
    /// Left edge, in layout units
    pub x: f64,
    /// Baseline vertical position, in layout units (larger = higher on page)
    pub y: f64,
    /// Fragment width
    pub w: f64,
    /// Fragment height
    pub h: f64,
}

impl Token {
    /// Create a token, normalizing the text (NBSP to space, collapsed
    /// whitespace). Returns `None` when the text normalizes to empty, so
    /// callers can filter blank fragments at the boundary.
    pub fn new(text: &str, x: f64, y: f64, w: f64, h: f64) -> Option<Self> {
        let text = normalize_text(text);
        if text.is_empty() {
            return None;
        }
        Some(Token { text, x, y, w, h })
    }

    /// Horizontal center of the fragment.
    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Right edge of the fragment.
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_text() {
        let t = Token::new("  22\u{a0}875 ", 10.0, 700.0, 40.0, 8.0).unwrap();
        assert_eq!(t.text, "22 875");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(Token::new("   ", 0.0, 0.0, 0.0, 0.0).is_none());
        assert!(Token::new("\u{a0}", 0.0, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_geometry_helpers() {
        let t = Token::new("x", 10.0, 0.0, 4.0, 8.0).unwrap();
        assert_eq!(t.center_x(), 12.0);
        assert_eq!(t.right(), 14.0);
    }
}
