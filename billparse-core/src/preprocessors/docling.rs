//! Docling JSON Preprocessor
//!
//! Reads the `texts` and `tables` arrays of a Docling export. Each item is
//! placed at its first provenance entry; items without provenance sit on
//! page 0 at the origin.

use crate::config::ParsingConfig;
use crate::error::BillParseError;
use crate::preprocessors::preprocessor::Preprocessor;
use crate::types::*;
use anyhow::Result;
use std::path::Path;

pub struct DoclingPreprocessor {
    title_marker: String,
}

impl Default for DoclingPreprocessor {
    fn default() -> Self {
        Self::new("BILL")
    }
}

impl DoclingPreprocessor {
    pub fn new(title_marker: &str) -> Self {
        Self {
            title_marker: title_marker.to_string(),
        }
    }

    fn first_position(prov: &[Provenance]) -> (u32, BoundingBox) {
        prov.first()
            .map(|p| (p.page_no, BoundingBox::from(&p.bbox)))
            .unwrap_or_default()
    }

    /// First section header mentioning the title marker
    fn find_title(&self, texts: &[DoclingText]) -> Option<String> {
        texts
            .iter()
            .find(|t| {
                ItemLabel::from_docling(&t.label) == ItemLabel::SectionHeader
                    && t.text.contains(&self.title_marker)
            })
            .map(|t| t.text.trim().to_string())
    }
}

impl Preprocessor for DoclingPreprocessor {
    fn parse_document(&self, bytes: &[u8]) -> Result<DoclingDocument> {
        let document: DoclingDocument = serde_json::from_slice(bytes)
            .map_err(|e| BillParseError::InvalidDocument(e.to_string()))?;
        Ok(document)
    }

    fn convert_document(&self, document: &DoclingDocument) -> Result<PreprocessorOutput> {
        let texts: Vec<RawItem> = document
            .texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let (page, bbox) = Self::first_position(&text.prov);
                RawItem::new(&text.text, ItemLabel::from_docling(&text.label), page, bbox.left, bbox.top)
                    .with_source(ItemSource::Text(index))
            })
            .collect();

        let tables: Vec<RawTable> = document
            .tables
            .iter()
            .enumerate()
            .map(|(index, table)| {
                let (page, bbox) = Self::first_position(&table.prov);
                RawTable {
                    index,
                    page,
                    bbox,
                    data: table.data.clone(),
                }
            })
            .collect();

        let page_count = document
            .texts
            .iter()
            .flat_map(|t| t.prov.iter())
            .chain(document.tables.iter().flat_map(|t| t.prov.iter()))
            .map(|p| p.page_no)
            .max()
            .unwrap_or(0);

        let metadata = DocumentMetadata {
            bill_id: None,
            title: self.find_title(&document.texts),
            page_count,
            text_count: texts.len(),
            table_count: tables.len(),
        };

        log::info!(
            "Loaded {} text items and {} tables across {} pages",
            metadata.text_count,
            metadata.table_count,
            metadata.page_count
        );
        if let Some(title) = &metadata.title {
            log::info!("Bill title: {title}");
        }

        Ok(PreprocessorOutput {
            texts,
            tables,
            metadata,
        })
    }

    fn configure(&mut self, config: &ParsingConfig) {
        self.title_marker = config.title_marker.clone();
    }

    fn name(&self) -> &str {
        "Docling JSON Preprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}
