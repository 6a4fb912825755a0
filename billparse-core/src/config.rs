use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_title_marker() -> String {
    "BILL".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Spatial statistics (margin clustering, header band)
    #[serde(default)]
    pub structure: StructureConfig,
    /// Item stream filtering
    #[serde(default)]
    pub stream: StreamConfig,
    /// Provision boundary detection
    #[serde(default)]
    pub boundary: BoundaryConfig,
    /// Markdown rendering of provision content
    #[serde(default)]
    pub markdown: MarkdownConfig,
    /// Substring identifying the bill title among section headers
    #[serde(default = "default_title_marker")]
    pub title_marker: String,
    /// Patterns (regex, or plain substring if the regex is invalid) of item
    /// texts to trace through the pipeline phases
    #[serde(default)]
    pub debug_filters: Vec<String>,
}

fn default_margin_bucket() -> f64 {
    5.0
}

fn default_min_cluster_size() -> usize {
    5
}

fn default_header_band_divisor() -> usize {
    10 // top 10% of observed y-coordinates
}

fn default_base_margin() -> f64 {
    72.0
}

fn default_header_y_threshold() -> f64 {
    800.0
}

fn default_centered_threshold() -> f64 {
    150.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Width of the rounding bucket used to cluster left margins (points)
    #[serde(default = "default_margin_bucket")]
    pub margin_bucket: f64,
    /// Minimum observations for a bucket to count as an indentation level
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// The header band is the top `1 / header_band_divisor` of y-coordinates
    #[serde(default = "default_header_band_divisor")]
    pub header_band_divisor: usize,
    /// Fallbacks used when the document yields no usable observations
    #[serde(default = "default_base_margin")]
    pub default_base_margin: f64,
    #[serde(default = "default_header_y_threshold")]
    pub default_header_y_threshold: f64,
    #[serde(default = "default_centered_threshold")]
    pub default_centered_threshold: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            margin_bucket: default_margin_bucket(),
            min_cluster_size: default_min_cluster_size(),
            header_band_divisor: default_header_band_divisor(),
            default_base_margin: default_base_margin(),
            default_header_y_threshold: default_header_y_threshold(),
            default_centered_threshold: default_centered_threshold(),
        }
    }
}

fn default_front_matter_pages() -> u32 {
    2 // cover page + table of contents
}

fn default_banner_margin_tolerance() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Items on pages up to and including this number are dropped
    #[serde(default = "default_front_matter_pages")]
    pub front_matter_pages: u32,
    /// How close to the base margin a page-top item must be to count as a
    /// left-aligned title banner (points)
    #[serde(default = "default_banner_margin_tolerance")]
    pub banner_margin_tolerance: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            front_matter_pages: default_front_matter_pages(),
            banner_margin_tolerance: default_banner_margin_tolerance(),
        }
    }
}

fn default_candidate_levels() -> usize {
    3
}

fn default_margin_tolerance() -> f64 {
    5.0
}

pub fn default_exclusion_rules() -> Vec<ExclusionRuleConfig> {
    vec![
        // "1. ", "2 ", "(1)", "(2) "
        ExclusionRuleConfig::new("numbered_clause", r"^(\d+[\.\s]|\(\d+\))"),
        // Quoted text being inserted into another act
        ExclusionRuleConfig::new("quoted_excerpt", r#"^['"]"#),
        // "(a)", "(b)", ...
        ExclusionRuleConfig::new("lettered_list", r"^\([a-z]\)"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Section headers must sit on one of the first N indentation levels
    #[serde(default = "default_candidate_levels")]
    pub candidate_levels: usize,
    /// Margin match tolerance against an indentation level (points)
    #[serde(default = "default_margin_tolerance")]
    pub margin_tolerance: f64,
    /// Ordered text rules that demote a section header to body content
    #[serde(default = "default_exclusion_rules")]
    pub exclusion_rules: Vec<ExclusionRuleConfig>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            candidate_levels: default_candidate_levels(),
            margin_tolerance: default_margin_tolerance(),
            exclusion_rules: default_exclusion_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRuleConfig {
    pub name: String,
    /// Regex matched against the trimmed header text
    pub pattern: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ExclusionRuleConfig {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            enabled: true,
        }
    }
}

fn default_indent_width() -> usize {
    2
}

fn default_level_tolerance() -> f64 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Spaces per list nesting level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// Margin match tolerance when picking a list item's nesting level (points)
    #[serde(default = "default_level_tolerance")]
    pub level_tolerance: f64,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            level_tolerance: default_level_tolerance(),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            structure: StructureConfig::default(),
            stream: StreamConfig::default(),
            boundary: BoundaryConfig::default(),
            markdown: MarkdownConfig::default(),
            title_marker: default_title_marker(),
            debug_filters: Vec::new(),
        }
    }
}

impl ParsingConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ParsingConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("Failed to load config from {p} ({e:#}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would make the statistics meaningless
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.structure.margin_bucket > 0.0,
            "structure.margin_bucket must be positive, got {}",
            self.structure.margin_bucket
        );
        ensure!(
            self.structure.header_band_divisor > 0,
            "structure.header_band_divisor must be at least 1"
        );
        ensure!(
            self.boundary.margin_tolerance >= 0.0 && self.markdown.level_tolerance >= 0.0,
            "margin tolerances must not be negative"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ParsingConfig::from_yaml_str("boundary:\n  candidate_levels: 2\n").unwrap();
        assert_eq!(config.boundary.candidate_levels, 2);
        assert_eq!(config.boundary.margin_tolerance, 5.0);
        assert_eq!(config.boundary.exclusion_rules.len(), 3);
        assert_eq!(config.stream.front_matter_pages, 2);
        assert_eq!(config.title_marker, "BILL");
    }

    #[test]
    fn default_config_survives_yaml_roundtrip() {
        let yaml = ParsingConfig::default().to_yaml_string().unwrap();
        let config = ParsingConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.boundary.exclusion_rules[1].pattern, r#"^['"]"#);
        assert_eq!(config.structure.header_band_divisor, 10);
    }

    #[test]
    fn zero_bucket_is_rejected() {
        let result = ParsingConfig::from_yaml_str("structure:\n  margin_bucket: 0\n");
        assert!(result.is_err());
    }
}
