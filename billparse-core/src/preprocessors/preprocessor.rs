// Preprocessor abstraction for document processing
//
// This module defines the boundary between input parsing (export file -> raw
// items) and the layout rules (raw items -> sections). Everything after this
// point works with RawItem/RawTable and is format-agnostic.

use crate::config::ParsingConfig;
use crate::types::*;
use anyhow::Result;
use std::path::Path;

/// Preprocessor trait - converts an extractor export into raw items
///
/// The preprocessing happens in two steps:
/// 1. Bytes -> typed export document (e.g. Docling JSON -> DoclingDocument)
/// 2. Export document -> PreprocessorOutput
pub trait Preprocessor {
    /// Step 1: Parse the raw export
    fn parse_document(&self, bytes: &[u8]) -> Result<DoclingDocument>;

    /// Step 2: Flatten the export into pipeline items
    fn convert_document(&self, document: &DoclingDocument) -> Result<PreprocessorOutput>;

    /// Full processing (both steps in sequence)
    fn process(&self, bytes: &[u8]) -> Result<PreprocessorOutput> {
        let document = self.parse_document(bytes)?;
        self.convert_document(&document)
    }

    /// Pick up the document-level settings of a parsing config
    fn configure(&mut self, _config: &ParsingConfig) {}

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// File stem with the extractor's `.docling` suffix removed
/// (`bill-12.docling.json` -> `bill-12`)
pub fn document_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_suffix(".docling") {
        Some(stripped) => stripped.to_string(),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_docling_suffix() {
        assert_eq!(document_stem(Path::new("bills/bill-12.docling.json")), "bill-12");
        assert_eq!(document_stem(Path::new("bill-12.json")), "bill-12");
        assert_eq!(document_stem(Path::new("archive.docling.v2.json")), "archive.docling.v2");
    }
}
