//! # finstat_extract
//!
//! Reconstructs structured numeric facts from positioned text extracted
//! from financial-statement PDFs, and from plain linearized text as a
//! fallback. Statement layouts arrive noisy: PDF text layers scatter row
//! fragments, OCR merges footnote digits into values, and thousand
//! grouping uses spaces ("22 875 000") that extraction loses or invents.
//!
//! ## Pipeline
//!
//! - **Row clustering** ([`layout::cluster_rows`]): group a page's
//!   positioned tokens into visual rows by vertical proximity.
//! - **Column resolution** ([`layout::resolve_columns`]): within a row,
//!   recover the year-column values via layered fallback strategies.
//! - **Run segmentation** ([`segment::split_grouped_run`]): split an
//!   ambiguous digit-and-space run into the most plausible value set with
//!   a cost-minimizing dynamic program.
//! - **Keyword matching** ([`scan`]): stream rows or text lines past a
//!   caller-supplied matcher set under per-key and total quotas.
//! - **Blending** ([`blend::blend_matched_lines`]): reconcile layout- and
//!   text-pipeline results per key, preferring the richer extraction.
//! - **Reporting normalizers** ([`report`]): money-string parsing with a
//!   sanity limit, header-year detection, canonical label rules.
//!
//! The core is purely computational: no I/O, no shared state, no
//! propagated failures. Every stage degrades to a best-effort fallback,
//! because the inputs (scanned statements) are inherently noisy.
//!
//! ## Quick start
//!
//! ```
//! use finstat_extract::matcher::{Matcher, ScanOptions};
//! use finstat_extract::scan::extract_matched_lines_from_text;
//!
//! # fn main() -> finstat_extract::error::Result<()> {
//! let matchers = Matcher::from_keywords(["Kreditinstitut"])?;
//! let text = "Skulder till kreditinstitut 112 500 87 250\n";
//! let lines = extract_matched_lines_from_text(text, &matchers, &ScanOptions::default());
//!
//! assert_eq!(lines[0].line, "Skulder till kreditinstitut");
//! assert_eq!(lines[0].values, vec!["112 500", "87 250"]);
//! # Ok(())
//! # }
//! ```

pub mod blend;
pub mod error;
pub mod layout;
pub mod lexer;
pub mod matcher;
pub mod report;
pub mod scan;
pub mod segment;
pub mod token;

pub use blend::blend_matched_lines;
pub use error::{Error, Result};
pub use layout::{cluster_rows, resolve_columns, Row};
pub use matcher::{MatchedLine, Matcher, ScanOptions, Source};
pub use scan::{extract_matched_lines_from_pages, extract_matched_lines_from_text};
pub use segment::{extract_numbers, split_grouped_run};
pub use token::Token;
