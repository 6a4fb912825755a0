use crate::config::MarkdownConfig;
use crate::types::{ItemLabel, RawItem, StructureProfile};

/// Renders provision content items as markdown lines
pub struct MarkdownFormatter<'a> {
    profile: &'a StructureProfile,
    config: &'a MarkdownConfig,
}

impl<'a> MarkdownFormatter<'a> {
    pub fn new(profile: &'a StructureProfile, config: &'a MarkdownConfig) -> Self {
        Self { profile, config }
    }

    pub fn format_item(&self, item: &RawItem) -> String {
        self.format(&item.text, item.label, item.bbox.left)
    }

    pub fn format(&self, text: &str, label: ItemLabel, left_margin: f64) -> String {
        if text.is_empty() {
            return String::new();
        }

        match label {
            // Only headers that were rejected as boundaries get here
            ItemLabel::SectionHeader => format!("## {text}"),
            ItemLabel::ListItem => {
                let indent_level = self
                    .profile
                    .level_index(left_margin, self.config.level_tolerance)
                    .unwrap_or(0);
                let indent = " ".repeat(self.config.indent_width * indent_level);
                format!("{indent}- {text}")
            }
            // Tables are already markdown
            ItemLabel::Table => text.to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StructureProfile {
        StructureProfile {
            indentation_levels: vec![70.0, 90.0, 110.0],
            base_margin: 70.0,
            header_y_threshold: 760.0,
            centered_threshold: 90.0,
        }
    }

    #[test]
    fn list_items_indent_by_level() {
        let profile = profile();
        let config = MarkdownConfig::default();
        let formatter = MarkdownFormatter::new(&profile, &config);

        assert_eq!(formatter.format("top", ItemLabel::ListItem, 71.0), "- top");
        assert_eq!(formatter.format("nested", ItemLabel::ListItem, 108.5), "    - nested");
        // No level within tolerance
        assert_eq!(formatter.format("stray", ItemLabel::ListItem, 200.0), "- stray");
    }

    #[test]
    fn headers_become_level_two_headings() {
        let profile = profile();
        let config = MarkdownConfig::default();
        let formatter = MarkdownFormatter::new(&profile, &config);

        assert_eq!(
            formatter.format("1. Definitions", ItemLabel::SectionHeader, 70.0),
            "## 1. Definitions"
        );
        assert_eq!(formatter.format("| a |", ItemLabel::Table, 70.0), "| a |");
        assert_eq!(formatter.format("", ItemLabel::SectionHeader, 70.0), "");
    }
}
