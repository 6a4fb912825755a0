use super::exclusion::ExclusionRules;
use crate::config::ParsingConfig;
use crate::markdown::MarkdownFormatter;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// What a single stream item means for the provision being built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryDecision {
    /// Starts a new provision with this title
    Boundary(String),
    /// Rendered markdown for the open provision
    Content(String),
    /// Renders to nothing
    Ignored,
}

/// Decides boundary vs content for one item. Pure: no accumulator state.
pub struct BoundaryClassifier<'a> {
    config: &'a ParsingConfig,
    profile: &'a StructureProfile,
    exclusions: &'a ExclusionRules,
    formatter: MarkdownFormatter<'a>,
}

impl<'a> BoundaryClassifier<'a> {
    pub fn new(
        config: &'a ParsingConfig,
        profile: &'a StructureProfile,
        exclusions: &'a ExclusionRules,
    ) -> Self {
        Self {
            config,
            profile,
            exclusions,
            formatter: MarkdownFormatter::new(profile, &config.markdown),
        }
    }

    pub fn classify(&self, item: &RawItem) -> BoundaryDecision {
        if self.is_provision_boundary(item) {
            return BoundaryDecision::Boundary(item.text.clone());
        }

        let rendered = self.formatter.format_item(item);
        if rendered.is_empty() {
            BoundaryDecision::Ignored
        } else {
            BoundaryDecision::Content(rendered)
        }
    }

    /// Section headers on one of the leftmost indentation levels start a
    /// provision, unless their text reads like a sub-clause, a quotation or
    /// a lettered item
    pub fn is_provision_boundary(&self, item: &RawItem) -> bool {
        if item.label != ItemLabel::SectionHeader || item.text.is_empty() {
            return false;
        }
        if !self.is_left_aligned(item.bbox.left) {
            return false;
        }

        match self.exclusions.first_match(&item.text) {
            Some(rule) => {
                log::trace!("Header '{}' kept as content ({})", item.text, rule.name());
                false
            }
            None => true,
        }
    }

    fn is_left_aligned(&self, left: f64) -> bool {
        let tolerance = self.config.boundary.margin_tolerance;
        self.profile
            .leftmost_levels(self.config.boundary.candidate_levels)
            .iter()
            .any(|margin| (left - margin).abs() < tolerance)
    }
}

/// Accumulator for the single segmentation pass
#[derive(Debug, Default)]
pub struct SegmentationState {
    current: Option<Provision>,
    provisions: Vec<Provision>,
}

impl SegmentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn apply(&mut self, decision: BoundaryDecision) {
        match decision {
            BoundaryDecision::Boundary(title) => {
                if let Some(done) = self.current.replace(Provision::new(title)) {
                    self.provisions.push(done);
                }
            }
            BoundaryDecision::Content(line) => {
                // Content before the first boundary has nowhere to go
                if let Some(open) = self.current.as_mut() {
                    open.content.push(line);
                }
            }
            BoundaryDecision::Ignored => {}
        }
    }

    /// Close the open provision and return all provisions in encounter order
    pub fn finish(mut self) -> Vec<Provision> {
        if let Some(last) = self.current.take() {
            self.provisions.push(last);
        }
        self.provisions
    }
}

pub struct ProvisionSegmenter<'a> {
    classifier: BoundaryClassifier<'a>,
}

impl<'a> ProvisionSegmenter<'a> {
    pub fn new(classifier: BoundaryClassifier<'a>) -> Self {
        Self { classifier }
    }

    pub fn segment(&self, items: &[RawItem]) -> Vec<Provision> {
        self.segment_with_trace(items, |_, _| {})
    }

    /// Segment while reporting every item's decision to `trace`
    pub fn segment_with_trace<F>(&self, items: &[RawItem], mut trace: F) -> Vec<Provision>
    where
        F: FnMut(&RawItem, &BoundaryDecision),
    {
        let mut state = SegmentationState::new();
        let mut dropped_before_first = 0;

        for item in items {
            let decision = self.classifier.classify(item);
            trace(item, &decision);

            if !state.is_open() && matches!(decision, BoundaryDecision::Content(_)) {
                dropped_before_first += 1;
            }
            state.apply(decision);
        }

        if dropped_before_first > 0 {
            log::debug!("{dropped_before_first} items preceded the first provision boundary and were dropped");
        }

        let provisions = state.finish();
        log::info!("Segmented {} items into {} provisions", items.len(), provisions.len());
        provisions
    }
}
