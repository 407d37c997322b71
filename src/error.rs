//! Error types for the extraction core.
//!
//! The extraction pipeline itself never fails: every stage degrades to a
//! best-effort fallback (unsegmentable runs come back as a single value,
//! ambiguous columns come back short, empty rows produce empty value lists).
//! The only fallible surface is matcher construction, where a caller-supplied
//! pattern may not compile.

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building the extraction inputs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A matcher pattern failed to compile.
    #[error("invalid matcher pattern for key '{key}': {source}")]
    InvalidPattern {
        /// The matcher key the pattern was supplied for
        key: String,
        /// The underlying regex compilation error
        #[source]
        source: regex::Error,
    },
}
