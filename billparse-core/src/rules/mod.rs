// Main rules module - delegates to the phase sub-modules
// - engine.rs: RuleEngine (phase orchestration) and debug tracing
// - spatial_statistics.rs: margin clustering and header band inference
// - stream_builder.rs: merged, sorted and filtered item stream
// - exclusion.rs: named header patterns that never open a provision
// - segmentation.rs: boundary classification and the segmentation pass
// - validation.rs: output invariant checks

pub mod engine;
pub mod exclusion;
pub mod segmentation;
pub mod spatial_statistics;
pub mod stream_builder;
pub mod validation;

pub use engine::*;
pub use exclusion::{ExclusionRule, ExclusionRules};
pub use segmentation::{BoundaryClassifier, BoundaryDecision, ProvisionSegmenter, SegmentationState};
pub use spatial_statistics::{cluster_margins, dominant_cluster, SpatialStatisticsAnalyzer};
pub use stream_builder::{ItemStreamBuilder, StreamStats};
pub use validation::{validate_sections, SectionValidator, ValidationIssue, ValidationReport};
