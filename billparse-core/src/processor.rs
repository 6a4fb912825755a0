use crate::assembler::slugify;
use crate::config::ParsingConfig;
use crate::error::BillParseError;
use crate::preprocessors::{document_stem, DoclingPreprocessor, Preprocessor};
use crate::rules::{RuleEngine, StreamStats, ValidationReport};
use crate::storage::{
    calculate_config_hash, DocumentStorage, FileStorage, NoOpStorage, SectionsCacheKey, SectionsCacheValue,
};
use crate::types::*;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics to inspect each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    pub metadata: DocumentMetadata,
    pub texts: Vec<RawItem>,
    pub profile: StructureProfile,
    pub stream_stats: StreamStats,
    pub stream: Vec<RawItem>,
    pub provisions: Vec<Provision>,
    pub sections: Vec<Section>,
    pub validation: ValidationReport,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        self.record(step_name, start.elapsed());
        result
    }

    /// Add a timing measured elsewhere (e.g. the rule engine's phases)
    pub fn record(&mut self, step_name: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        log::info!("⏱️  {}: {}ms", step_name, elapsed.as_millis());
        self.timings.push((step_name.to_string(), elapsed));
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        log::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            log::info!(
                "   {:.<35} {}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        log::info!("   {:.<35} {}ms", "Total", total.as_millis());
    }
}

/// Per-call processing switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    pub profile: bool,
    pub skip_cache: bool,
}

pub struct DocumentProcessor {
    preprocessor: Box<dyn Preprocessor>,
    storage: Box<dyn DocumentStorage + Send + Sync>,
    rule_engine: RuleEngine,
    engine_config_hash: String,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_dependencies(
        mut preprocessor: Box<dyn Preprocessor>,
        storage: Box<dyn DocumentStorage + Send + Sync>,
        config: ParsingConfig,
    ) -> Result<Self> {
        preprocessor.configure(&config);
        let engine_config_hash = calculate_config_hash(&config)?;
        Ok(Self {
            preprocessor,
            storage,
            rule_engine: RuleEngine::new(config)?,
            engine_config_hash,
        })
    }

    /// Convenience constructor for CLI usage: Docling input, file cache in
    /// `cache_dir` (no caching when `None`)
    pub fn new_cli(cache_dir: Option<&Path>, config: ParsingConfig) -> Result<Self> {
        let preprocessor = Box::new(DoclingPreprocessor::new(&config.title_marker));
        let storage: Box<dyn DocumentStorage + Send + Sync> = match cache_dir {
            Some(dir) => Box::new(FileStorage::new(dir)?),
            None => Box::new(NoOpStorage::new()),
        };
        Self::new_with_dependencies(preprocessor, storage, config)
    }

    /// Recompile the rule engine when called with a different config
    fn use_config(&mut self, config: &ParsingConfig, config_hash: &str) -> Result<()> {
        if self.engine_config_hash != config_hash {
            log::debug!("Config changed, recompiling rule engine");
            self.rule_engine = RuleEngine::new(config.clone())?;
            self.preprocessor.configure(config);
            self.engine_config_hash = config_hash.to_string();
        }
        Ok(())
    }

    fn read_input(&self, input_path: &Path) -> Result<Vec<u8>> {
        if !self.preprocessor.supports_file_type(input_path) {
            return Err(BillParseError::UnsupportedInput(input_path.display().to_string()).into());
        }
        std::fs::read(input_path)
            .with_context(|| format!("Failed to read input file {}", input_path.display()))
    }

    fn preprocess(&self, input_path: &Path, bill_id: &str, bytes: &[u8]) -> Result<PreprocessorOutput> {
        let mut output = self
            .preprocessor
            .process(bytes)
            .with_context(|| format!("Failed to preprocess {}", input_path.display()))?;
        output.metadata.bill_id = Some(bill_id.to_string());
        Ok(output)
    }

    /// Main entry point: input + config -> sections, with result caching.
    /// Nothing is cached unless the whole document processed successfully.
    pub fn process_document_with_options(
        &mut self,
        input_path: &Path,
        config: &ParsingConfig,
        options: ProcessOptions,
    ) -> Result<ProcessedBill> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(options.profile);

        let config_hash = calculate_config_hash(config)?;
        self.use_config(config, &config_hash)?;

        let input_bytes = profiler.time_step("1. Read Input", || self.read_input(input_path))?;
        let bill_id = bill_id_for(input_path);
        let cache_key = profiler.time_step("2. Cache Key Generation", || {
            SectionsCacheKey::new(&bill_id, &input_bytes, &config_hash)
        });

        // Tracing only happens on a real run, so debug filters bypass the lookup
        let use_cache = !options.skip_cache && config.debug_filters.is_empty();
        let cached = if use_cache {
            profiler.time_step("3. Cache Lookup", || self.storage.get_sections_output(&cache_key))?
        } else {
            log::info!("🚫 Skipping cache lookup");
            None
        };

        if let Some(cached) = cached {
            log::info!(
                "🎯 Cache hit: sections for this input + config were computed {}",
                cached.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            profiler.log_summary();
            return Ok(cached.bill);
        }

        log::info!("📄 Processing document: {}", input_path.display());

        let preprocessor_output = profiler.time_step("4. Preprocessing", || {
            self.preprocess(input_path, &bill_id, &input_bytes)
        })?;

        let engine_start = Instant::now();
        let output = self.rule_engine.run(&preprocessor_output);
        let engine_elapsed = engine_start.elapsed();
        for (phase, elapsed) in self.rule_engine.take_phase_timings() {
            profiler.record(&format!("5. {phase}"), elapsed);
        }
        log::debug!("Rule engine finished in {}ms", engine_elapsed.as_millis());

        let bill = ProcessedBill {
            metadata: preprocessor_output.metadata,
            profile: output.profile,
            document: BillDocument {
                sections: output.sections,
            },
        };

        if options.skip_cache {
            log::info!("🚫 Skipping cache storage");
        } else {
            profiler.time_step("6. Cache Storage", || {
                let processing_time = start_time.elapsed().as_millis() as u64;
                let cache_value = SectionsCacheValue::new(bill.clone(), processing_time);
                self.storage.store_sections_output(&cache_key, &cache_value)
            })?;
        }

        profiler.log_summary();
        log::info!(
            "⏱️  Total processing time: {}ms",
            start_time.elapsed().as_millis()
        );
        Ok(bill)
    }

    /// Process document with specific config and default options
    pub fn process_document_with_config(
        &mut self,
        input_path: &Path,
        config: &ParsingConfig,
    ) -> Result<ProcessedBill> {
        self.process_document_with_options(input_path, config, ProcessOptions::default())
    }

    /// Process document and capture all intermediate stage outputs.
    /// Never touches the cache.
    pub fn process_document_capture_stages(
        &mut self,
        input_path: &Path,
        config: &ParsingConfig,
    ) -> Result<PipelineStages> {
        let config_hash = calculate_config_hash(config)?;
        self.use_config(config, &config_hash)?;

        let input_bytes = self.read_input(input_path)?;
        let preprocessor_output = self.preprocess(input_path, &bill_id_for(input_path), &input_bytes)?;
        log::info!(
            "📋 Stage 1: {} text items, {} tables captured",
            preprocessor_output.texts.len(),
            preprocessor_output.tables.len()
        );

        let output = self.rule_engine.run(&preprocessor_output);
        self.rule_engine.take_phase_timings();
        log::info!(
            "📋 Stage 2: {} stream items, {} provisions, {} sections captured",
            output.stream.len(),
            output.provisions.len(),
            output.sections.len()
        );

        Ok(PipelineStages {
            metadata: preprocessor_output.metadata,
            texts: preprocessor_output.texts,
            profile: output.profile,
            stream_stats: output.stream_stats,
            stream: output.stream,
            provisions: output.provisions,
            sections: output.sections,
            validation: output.validation,
        })
    }

    /// Simple document processing function using default config
    pub fn process_document(&mut self, input_path: &Path) -> Result<ProcessedBill> {
        let default_config = ParsingConfig::default();
        self.process_document_with_config(input_path, &default_config)
    }

    /// Process document with config loaded from file
    pub fn process_document_with_config_file(
        &mut self,
        input_path: &Path,
        config_path: &str,
    ) -> Result<ProcessedBill> {
        let config = ParsingConfig::load_from_file(config_path)?;
        self.process_document_with_config(input_path, &config)
    }
}

/// Bill id of an input file: slug of its stem
pub fn bill_id_for(input_path: &Path) -> String {
    slugify(&document_stem(input_path))
}
