use crate::types::*;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `{"sections": [...]}`, the format downstream steps consume
    #[default]
    Sections,
    Markdown,
    Flat,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sections" => Some(OutputFormat::Sections),
            "markdown" => Some(OutputFormat::Markdown),
            "flat" => Some(OutputFormat::Flat),
            _ => None,
        }
    }

    /// Unknown names fall back to sections with a warning
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown output format '{name}', writing sections");
            OutputFormat::Sections
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Sections | OutputFormat::Flat => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatDocument {
    pub format: String,
    pub chunks: Vec<String>,
}

impl BillDocument {
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ProcessedBill {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.metadata.title {
            out.push_str(&format!("# {title}\n\n"));
        }
        for section in &self.document.sections {
            out.push_str(&format!("## {}\n\n", section.title));
            if !section.raw_text.is_empty() {
                out.push_str(&section.raw_text);
                out.push_str("\n\n");
            }
        }
        let trimmed_len = out.trim_end().len();
        out.truncate(trimmed_len);
        out.push('\n');
        out
    }

    pub fn to_flat_format(&self) -> FlatDocument {
        FlatDocument {
            format: "flat".to_string(),
            chunks: self
                .document
                .sections
                .iter()
                .map(|section| section.raw_text.clone())
                .collect(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Sections => self.document.to_json_string(),
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Flat => Ok(serde_json::to_string_pretty(&self.to_flat_format())?),
        }
    }

    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let content = self.render(format)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write output file {}", path.display()))?;
        Ok(())
    }

    pub fn save_with_format(&self, path: &Path, format: &str) -> Result<()> {
        self.save(path, OutputFormat::from_name_or_default(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(title: Option<&str>) -> ProcessedBill {
        ProcessedBill {
            metadata: DocumentMetadata {
                title: title.map(str::to_string),
                ..DocumentMetadata::default()
            },
            profile: StructureProfile {
                indentation_levels: vec![72.0, 90.0],
                base_margin: 72.0,
                header_y_threshold: 800.0,
                centered_threshold: 81.0,
            },
            document: BillDocument {
                sections: vec![
                    Section {
                        id: "1-short-title".to_string(),
                        index: 1,
                        title: "Short title".to_string(),
                        raw_text: "This Act may be cited as...".to_string(),
                    },
                    Section {
                        id: "2-interpretation".to_string(),
                        index: 2,
                        title: "Interpretation".to_string(),
                        raw_text: String::new(),
                    },
                ],
            },
        }
    }

    #[test]
    fn sections_json_uses_raw_text_field_name() {
        let json: serde_json::Value =
            serde_json::from_str(&bill(None).render(OutputFormat::Sections).unwrap()).unwrap();
        assert_eq!(json["sections"][0]["rawText"], "This Act may be cited as...");
        assert_eq!(json["sections"][1]["id"], "2-interpretation");
        assert!(json["sections"][0].get("raw_text").is_none());
    }

    #[test]
    fn markdown_layout() {
        let markdown = bill(Some("SAMPLE BILL")).to_markdown();
        assert_eq!(
            markdown,
            "# SAMPLE BILL\n\n## Short title\n\nThis Act may be cited as...\n\n## Interpretation\n"
        );
        assert!(bill(None).to_markdown().starts_with("## Short title"));
    }

    #[test]
    fn flat_chunks_follow_section_order() {
        let flat = bill(None).to_flat_format();
        assert_eq!(flat.format, "flat");
        assert_eq!(flat.chunks, vec!["This Act may be cited as...".to_string(), String::new()]);
    }

    #[test]
    fn unknown_format_falls_back_to_sections() {
        assert_eq!(OutputFormat::from_name_or_default("graph"), OutputFormat::Sections);
        assert_eq!(OutputFormat::from_name("markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Flat.extension(), "json");
    }
}
