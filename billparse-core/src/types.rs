use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== INPUT: DOCLING DOCUMENT =====
// Only the fields the segmentation pipeline reads are modelled. Everything else
// in a Docling export (body tree, furniture, pictures, ...) is ignored by serde.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoclingDocument {
    #[serde(default)]
    pub texts: Vec<DoclingText>,
    #[serde(default)]
    pub tables: Vec<DoclingTable>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoclingText {
    #[serde(default)]
    pub text: String,
    /// Docling label in snake_case ("section_header", "list_item", "text", ...)
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub prov: Vec<Provenance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoclingTable {
    #[serde(default)]
    pub prov: Vec<Provenance>,
    #[serde(default)]
    pub data: TableData,
}

/// Raw cell grid of one table.
///
/// Cells are kept as untyped JSON so that a malformed cell degrades only the
/// table it belongs to (see `tables::flatten_table`) instead of failing the
/// whole document at deserialization time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub table_cells: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub bbox: DoclingBBox,
}

/// Docling bounding box. `t` uses a bottom-left page origin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoclingBBox {
    #[serde(default)]
    pub l: f64,
    #[serde(default)]
    pub t: f64,
}

// ===== PIPELINE ITEMS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLabel {
    SectionHeader,
    ListItem,
    Table,
    PageHeader,
    PageFooter,
    Other,
}

impl ItemLabel {
    pub fn from_docling(label: &str) -> Self {
        match label {
            "section_header" => ItemLabel::SectionHeader,
            "list_item" => ItemLabel::ListItem,
            "table" => ItemLabel::Table,
            "page_header" => ItemLabel::PageHeader,
            "page_footer" => ItemLabel::PageFooter,
            _ => ItemLabel::Other,
        }
    }

    /// Running headers and footers never carry provision content
    pub fn is_page_furniture(&self) -> bool {
        matches!(self, ItemLabel::PageHeader | ItemLabel::PageFooter)
    }
}

/// Page-relative position of an item. Missing coordinates are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    /// Bottom-left origin: larger values are higher on the page
    pub top: f64,
}

impl From<&DoclingBBox> for BoundingBox {
    fn from(bbox: &DoclingBBox) -> Self {
        Self {
            left: bbox.l,
            top: bbox.t,
        }
    }
}

/// Where a stream item came from in the input document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum ItemSource {
    Text(usize),
    Table(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub text: String,
    pub label: ItemLabel,
    /// 1-based page number, 0 when the item has no provenance
    pub page: u32,
    pub bbox: BoundingBox,
    pub source: ItemSource,
}

impl RawItem {
    pub fn new(text: &str, label: ItemLabel, page: u32, left: f64, top: f64) -> Self {
        Self {
            text: text.trim().to_string(),
            label,
            page,
            bbox: BoundingBox { left, top },
            source: ItemSource::Text(0),
        }
    }

    pub fn with_source(mut self, source: ItemSource) -> Self {
        self.source = source;
        self
    }
}

/// One table as handed over by the preprocessor, before flattening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub index: usize,
    pub page: u32,
    pub bbox: BoundingBox,
    pub data: TableData,
}

// ===== STRUCTURE PROFILE =====

/// One retained margin cluster: bucket center and number of observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginCluster {
    pub center: f64,
    pub count: usize,
}

/// Document-wide layout statistics, computed once before segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureProfile {
    /// Ascending cluster centers of left margins
    pub indentation_levels: Vec<f64>,
    pub base_margin: f64,
    pub header_y_threshold: f64,
    pub centered_threshold: f64,
}

impl StructureProfile {
    /// The first `count` indentation levels (fewer if the document has fewer)
    pub fn leftmost_levels(&self, count: usize) -> &[f64] {
        let end = count.min(self.indentation_levels.len());
        &self.indentation_levels[..end]
    }

    /// Index of the first indentation level strictly within `tolerance` of `left`
    pub fn level_index(&self, left: f64, tolerance: f64) -> Option<usize> {
        self.indentation_levels
            .iter()
            .position(|level| (left - level).abs() < tolerance)
    }
}

// ===== SEGMENTATION AND OUTPUT =====

/// A provision while it is being accumulated by the segmenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provision {
    pub title: String,
    pub content: Vec<String>,
}

impl Provision {
    pub fn new(title: String) -> Self {
        Self {
            title,
            content: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub index: usize,
    pub title: String,
    #[serde(rename = "rawText")]
    pub raw_text: String,
}

/// The bill JSON written for downstream collaborators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDocument {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Slug of the input file stem
    pub bill_id: Option<String>,
    /// First section header mentioning the title marker ("BILL")
    pub title: Option<String>,
    pub page_count: u32,
    pub text_count: usize,
    pub table_count: usize,
}

/// Complete output from preprocessing a Docling document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorOutput {
    pub texts: Vec<RawItem>,
    pub tables: Vec<RawTable>,
    pub metadata: DocumentMetadata,
}

/// Result of processing one document end to end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBill {
    pub metadata: DocumentMetadata,
    pub profile: StructureProfile,
    pub document: BillDocument,
}
