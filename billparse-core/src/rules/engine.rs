use crate::assembler::ProvisionAssembler;
use crate::config::ParsingConfig;
use crate::types::*;
use anyhow::Result;
use regex::Regex;
use std::cell::RefCell;
use std::time::{Duration, Instant};

use super::exclusion::ExclusionRules;
use super::segmentation::{BoundaryClassifier, BoundaryDecision, ProvisionSegmenter};
use super::spatial_statistics::SpatialStatisticsAnalyzer;
use super::stream_builder::{ItemStreamBuilder, StreamStats};
use super::validation::{validate_sections, ValidationReport};

// Debug configuration for pipeline tracing
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub filter_patterns: Vec<String>,
}

impl DebugConfig {
    pub fn new(enabled: bool, filter_patterns: Vec<String>) -> Self {
        Self {
            enabled,
            filter_patterns,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            filter_patterns: Vec::new(),
        }
    }

    /// Enabled exactly when there is something to filter on
    pub fn from_filters(filter_patterns: Vec<String>) -> Self {
        Self::new(!filter_patterns.is_empty(), filter_patterns)
    }
}

/// One compiled debug filter: regex, falling back to a plain substring when
/// the pattern is not a valid regex
#[derive(Debug, Clone)]
enum DebugMatcher {
    Regex(Regex),
    Substring(String),
}

impl DebugMatcher {
    fn compile(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => DebugMatcher::Regex(regex),
            Err(_) => DebugMatcher::Substring(pattern.to_string()),
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            DebugMatcher::Regex(regex) => regex.is_match(text),
            DebugMatcher::Substring(needle) => text.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DebugTracer {
    matchers: Vec<DebugMatcher>,
}

impl DebugTracer {
    fn new(debug_config: &DebugConfig) -> Self {
        if !debug_config.enabled {
            return Self::default();
        }
        Self {
            matchers: debug_config
                .filter_patterns
                .iter()
                .map(|pattern| DebugMatcher::compile(pattern))
                .collect(),
        }
    }

    fn is_active(&self) -> bool {
        !self.matchers.is_empty()
    }

    fn matches(&self, item: &RawItem) -> bool {
        self.matchers.iter().any(|m| m.matches(&item.text))
    }
}

fn text_preview(text: &str) -> String {
    if text.chars().count() > 50 {
        format!("{}...", text.chars().take(47).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Debug utility function to trace items through the pipeline
fn debug_pipeline_items(phase: &str, items: &[RawItem], tracer: &DebugTracer) {
    if !tracer.is_active() {
        return;
    }

    let matching: Vec<_> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| tracer.matches(item))
        .collect();

    if matching.is_empty() {
        return;
    }
    log::info!("[{}] {} matching items:", phase, matching.len());
    for (index, item) in matching {
        log::info!(
            "  Item {}: \"{}\" ({:?}, page {}, left {:.1}, top {:.1})",
            index,
            text_preview(&item.text),
            item.label,
            item.page,
            item.bbox.left,
            item.bbox.top
        );
    }
}

/// Everything one engine run produced, phase by phase
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub profile: StructureProfile,
    pub stream_stats: StreamStats,
    pub stream: Vec<RawItem>,
    pub provisions: Vec<Provision>,
    pub sections: Vec<Section>,
    pub validation: ValidationReport,
}

/// Runs the segmentation phases in order:
/// analyze -> build stream -> segment -> assemble -> validate
pub struct RuleEngine {
    config: ParsingConfig,
    exclusions: ExclusionRules,
    tracer: DebugTracer,
    pub phase_timings: RefCell<Vec<(String, Duration)>>,
}

impl RuleEngine {
    /// Compile a configuration once; debug filters from the config are traced
    pub fn new(config: ParsingConfig) -> Result<Self> {
        config.validate()?;
        let exclusions = ExclusionRules::from_config(&config.boundary)?;
        let tracer = DebugTracer::new(&DebugConfig::from_filters(config.debug_filters.clone()));

        log::debug!(
            "Rule engine ready: exclusion rules {:?}, {} debug filters",
            exclusions.names(),
            tracer.matchers.len()
        );

        Ok(Self {
            config,
            exclusions,
            tracer,
            phase_timings: RefCell::new(Vec::new()),
        })
    }

    /// Take the per-phase timings recorded since the last call
    pub fn take_phase_timings(&self) -> Vec<(String, Duration)> {
        self.phase_timings.borrow_mut().drain(..).collect()
    }

    fn timed<T>(&self, phase: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.phase_timings
            .borrow_mut()
            .push((phase.to_string(), start.elapsed()));
        result
    }

    pub fn analyze(&self, texts: &[RawItem]) -> StructureProfile {
        debug_pipeline_items("Input", texts, &self.tracer);
        SpatialStatisticsAnalyzer::new(&self.config).analyze(texts)
    }

    pub fn build_stream(
        &self,
        profile: &StructureProfile,
        texts: &[RawItem],
        tables: &[RawTable],
    ) -> (Vec<RawItem>, StreamStats) {
        let (stream, stats) = ItemStreamBuilder::new(&self.config, profile).build(texts, tables);
        debug_pipeline_items("ItemStream", &stream, &self.tracer);
        (stream, stats)
    }

    pub fn segment(&self, profile: &StructureProfile, stream: &[RawItem]) -> Vec<Provision> {
        let classifier = BoundaryClassifier::new(&self.config, profile, &self.exclusions);
        let segmenter = ProvisionSegmenter::new(classifier);

        if !self.tracer.is_active() {
            return segmenter.segment(stream);
        }
        segmenter.segment_with_trace(stream, |item, decision| {
            if !self.tracer.matches(item) {
                return;
            }
            let outcome = match decision {
                BoundaryDecision::Boundary(_) => "opens provision".to_string(),
                BoundaryDecision::Content(line) => format!("content \"{}\"", text_preview(line)),
                BoundaryDecision::Ignored => "ignored".to_string(),
            };
            log::info!(
                "[Segmentation] \"{}\" ({:?}, page {}, left {:.1}): {}",
                text_preview(&item.text),
                item.label,
                item.page,
                item.bbox.left,
                outcome
            );
        })
    }

    pub fn assemble(&self, provisions: Vec<Provision>) -> Vec<Section> {
        ProvisionAssembler::new().assemble(provisions)
    }

    pub fn validate(&self, sections: &[Section]) -> ValidationReport {
        validate_sections(sections)
    }

    /// Run every phase over one preprocessed document
    pub fn run(&self, input: &PreprocessorOutput) -> EngineOutput {
        self.phase_timings.borrow_mut().clear();

        let profile = self.timed("SpatialStatistics", || self.analyze(&input.texts));
        let (stream, stream_stats) = self.timed("ItemStream", || {
            self.build_stream(&profile, &input.texts, &input.tables)
        });
        let provisions = self.timed("Segmentation", || self.segment(&profile, &stream));
        let sections = self.timed("Assembly", || self.assemble(provisions.clone()));
        let validation = self.timed("Validation", || self.validate(&sections));

        EngineOutput {
            profile,
            stream_stats,
            stream,
            provisions,
            sections,
            validation,
        }
    }
}
