use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use billparse::{
    default_output_path, preview_section, DocumentProcessor, OutputFormat, ParsingConfig,
    PipelineStages, ProcessOptions, ProcessedBill,
};

#[derive(Parser)]
#[command(name = "billparse")]
#[command(about = "Split a Docling JSON export of a bill into titled provisions")]
struct Args {
    /// Path to the Docling JSON export (e.g. output/bill.docling.json)
    #[arg(required_unless_present = "print_default_config")]
    input: Option<PathBuf>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path (default: next to the input, `.docling` removed)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: sections, markdown, or flat
    #[arg(short = 'f', long, default_value = "sections")]
    output_format: String,

    /// Reprocess even if the output file already exists
    #[arg(long)]
    force: bool,

    /// Skip cache and force fresh processing (useful for development/testing)
    #[arg(long)]
    skip_cache: bool,

    /// Cache processed sections in this directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "stages")]
    stages_dir: PathBuf,

    /// Trace items whose text matches this pattern (regex or substring); repeatable
    #[arg(long = "debug-filter")]
    debug_filters: Vec<String>,

    /// Print the default configuration as YAML and exit
    #[arg(long)]
    print_default_config: bool,

    /// Number of provisions to preview after processing
    #[arg(long, default_value_t = 3)]
    preview: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", ParsingConfig::default().to_yaml_string()?);
        return Ok(());
    }

    let Some(input) = args.input.clone() else {
        eprintln!("❌ No input file given");
        std::process::exit(1);
    };

    println!("🦀 Billparse Provision Extractor");

    // Check if input file exists
    if !input.exists() {
        eprintln!("❌ Error: File not found: {}", input.display());
        std::process::exit(1);
    }

    let format = OutputFormat::from_name_or_default(&args.output_format);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&input, format));

    if output_path.exists() && !args.force && !args.dump_stages {
        println!("✓ Output already exists: {}", output_path.display());
        println!("  Skipping section extraction (use --force to reprocess)");
        return Ok(());
    }

    let mut config = ParsingConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }

    // Apply CLI overrides to config
    if !args.debug_filters.is_empty() {
        config.debug_filters.extend(args.debug_filters.iter().cloned());
    }

    let mut processor = DocumentProcessor::new_cli(args.cache_dir.as_deref(), config.clone())?;

    println!("📄 Processing: {}", input.display());

    // Stage dump mode: capture and save all intermediates
    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        match processor.process_document_capture_stages(&input, &config) {
            Ok(stages) => {
                save_stages(&stages, &input, &args.stages_dir)?;
                println!("\n✅ All stages dumped to: {}", args.stages_dir.display());
            }
            Err(e) => {
                eprintln!("❌ Stage dump failed: {e:#}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let options = ProcessOptions {
        profile: args.profile,
        skip_cache: args.skip_cache,
    };
    match processor.process_document_with_options(&input, &config, options) {
        Ok(bill) => {
            print_summary(&bill, args.preview);
            bill.save(&output_path, format)?;
            println!("{}", "=".repeat(80));
            println!("✓ Output created: {}", output_path.display());
            println!("{}", "=".repeat(80));
        }
        Err(e) => {
            eprintln!("❌ Processing failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_summary(bill: &ProcessedBill, preview_count: usize) {
    let profile = &bill.profile;
    println!("\nInferred document structure:");
    println!("  Indentation levels: {:?}", profile.indentation_levels);
    println!("  Base margin: {}", profile.base_margin);
    println!("  Header Y threshold: {:.1}", profile.header_y_threshold);
    println!();

    let sections = &bill.document.sections;
    println!("{}", "=".repeat(80));
    println!("EXTRACTED {} PROVISIONS", sections.len());
    println!("{}", "=".repeat(80));
    println!();

    for section in sections.iter().take(preview_count) {
        println!("{}", section.title);
        println!("{}", preview_section(section, 5, 200));
        println!("{}", "-".repeat(40));
        println!();
    }

    if sections.len() > preview_count {
        println!("... and {} more provisions", sections.len() - preview_count);
        println!();
    }
}

fn save_stages(stages: &PipelineStages, input: &Path, output_dir: &Path) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    let write_stage = |file_name: &str, json: String| -> Result<PathBuf> {
        let path = output_dir.join(file_name);
        fs::write(&path, json)?;
        Ok(path)
    };

    // Stage 1: Raw text items from the preprocessor
    let path = write_stage("stage1_texts.json", serde_json::to_string_pretty(&stages.texts)?)?;
    println!("  💾 {} ({} items)", path.display(), stages.texts.len());

    // Stage 2: Structure profile
    let path = write_stage("stage2_profile.json", serde_json::to_string_pretty(&stages.profile)?)?;
    println!("  💾 {}", path.display());

    // Stage 3: Sorted and filtered item stream
    let path = write_stage("stage3_stream.json", serde_json::to_string_pretty(&stages.stream)?)?;
    println!("  💾 {} ({} items)", path.display(), stages.stream.len());

    // Stage 4: Provisions before assembly
    let path = write_stage("stage4_provisions.json", serde_json::to_string_pretty(&stages.provisions)?)?;
    println!("  💾 {} ({} provisions)", path.display(), stages.provisions.len());

    // Stage 5: Final sections
    let sections = serde_json::json!({ "sections": stages.sections });
    let path = write_stage("stage5_sections.json", serde_json::to_string_pretty(&sections)?)?;
    println!("  💾 {} ({} sections)", path.display(), stages.sections.len());

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "input": input.display().to_string(),
        "bill_id": stages.metadata.bill_id,
        "title": stages.metadata.title,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stream_stats": stages.stream_stats,
        "validation": {
            "quality_score": stages.validation.quality_score,
            "issues": stages.validation.issues,
        },
        "stage_counts": {
            "texts": stages.texts.len(),
            "stream_items": stages.stream.len(),
            "provisions": stages.provisions.len(),
            "sections": stages.sections.len(),
        }
    });
    let path = write_stage("summary.json", serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", path.display());
    log::debug!("Stage dump complete for {}", input.display());

    Ok(())
}
