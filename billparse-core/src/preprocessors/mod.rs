//! Document Preprocessors
//!
//! Converts an extractor export into the unified `PreprocessorOutput` that
//! feeds the rule engine.
//!
//! ```text
//! Docling JSON export
//!     ↓
//! [DoclingPreprocessor]
//!     ↓
//! PreprocessorOutput (raw text items + raw tables + metadata)
//!     ↓
//! [RuleEngine]
//!     ↓
//! BillDocument
//! ```

pub mod docling;
pub mod preprocessor;

pub use docling::DoclingPreprocessor;
pub use preprocessor::{document_stem, Preprocessor};
