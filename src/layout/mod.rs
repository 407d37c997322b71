//! Layout reconstruction for positioned statement text.
//!
//! - Row clustering: group a page's tokens into visual rows by vertical
//!   proximity.
//! - Column resolution: within a row, group numeric tokens into column
//!   values by horizontal proximity, with layered fallback strategies.

pub mod columns;
pub mod rows;

pub use columns::resolve_columns;
pub use rows::{cluster_rows, Row};
