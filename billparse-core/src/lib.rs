// Billparse Core Library
//
// Reconstructs the provisions of a legislative bill from a Docling layout
// export. Main interface for converting documents to indexed sections.

pub mod assembler;
pub mod config;
pub mod error;
pub mod markdown;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod serialization;
pub mod storage;
pub mod tables;
pub mod types;

// Re-export main types and functions for easy use
pub use assembler::{slugify, ProvisionAssembler};
pub use config::ParsingConfig;
pub use error::BillParseError;
pub use preprocessors::{document_stem, DoclingPreprocessor, Preprocessor};
pub use processor::{DocumentProcessor, PipelineStages, ProcessOptions, StepProfiler};
pub use rules::{DebugConfig, RuleEngine};
pub use serialization::{FlatDocument, OutputFormat};
pub use tables::{flatten_table, FlattenedTable, TABLE_FAILED_MARKER};
pub use types::*;
