use thiserror::Error;

/// Structured failures callers may want to match on.
/// Everything else propagates as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum BillParseError {
    #[error("invalid pattern for rule '{name}': {source}")]
    InvalidRulePattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid Docling document: {0}")]
    InvalidDocument(String),

    #[error("unsupported input file: {0} (expected a Docling .json export)")]
    UnsupportedInput(String),
}
