// src/main.rs
use clap::{Parser, Subcommand};
use filing_kpi_extractor::config::{
    EmptyPagePolicy, PipelineConfig, DEFAULT_CONTEXT_RADIUS, DEFAULT_HEADER_PATTERN, DEFAULT_RISK_TITLE,
    DEFAULT_SNIPPET_LEN,
};
use filing_kpi_extractor::pipeline;
use filing_kpi_extractor::utils::{self, AppError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command Line Interface for the filing KPI extraction pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding source documents (PDF, HTML, TXT)
    #[arg(long, env = "FKE_INPUT_DIR", default_value = "./data/raw", global = true)]
    input_dir: PathBuf,

    /// Directory for page-delimited text artifacts
    #[arg(long, env = "FKE_PROCESSED_DIR", default_value = "./data/processed", global = true)]
    processed_dir: PathBuf,

    /// Output directory for per-report artifacts
    #[arg(short, long, env = "FKE_OUTPUT_DIR", default_value = "./output", global = true)]
    output_dir: PathBuf,

    /// Section header regex; the first capture group is the title
    #[arg(long, default_value = DEFAULT_HEADER_PATTERN, global = true)]
    header_pattern: String,

    /// Characters of context kept either side of a KPI mention
    #[arg(long, default_value_t = DEFAULT_CONTEXT_RADIUS, global = true)]
    context_radius: usize,

    /// Length of the section preview snippet, in characters
    #[arg(long, default_value_t = DEFAULT_SNIPPET_LEN, global = true)]
    snippet_len: usize,

    /// Section title (substring, case-sensitive) holding the risk factors
    #[arg(long, default_value = DEFAULT_RISK_TITLE, global = true)]
    risk_title: String,

    /// Drop pages with no extractable text instead of keeping them as empty pages
    #[arg(long, global = true)]
    skip_empty_pages: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract page-delimited text from every document in the input directory
    ExtractText,
    /// Identify titled sections in a processed report
    IdentifySections {
        /// Report name (source document file stem)
        #[arg(short, long)]
        report: String,
    },
    /// Scan a report's sections for KPI candidates
    ExtractKpis {
        #[arg(short, long)]
        report: String,
    },
    /// Write the raw risk factors and ensure the validation checklist exists
    BuildOutputs {
        #[arg(short, long)]
        report: String,
    },
    /// Run all stages for every document in the input directory
    Run,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new(&self.input_dir, &self.processed_dir, &self.output_dir);
        config.header_pattern = self.header_pattern.clone();
        config.context_radius = self.context_radius;
        config.snippet_len = self.snippet_len;
        config.risk_title = self.risk_title.clone();
        if self.skip_empty_pages {
            config.empty_pages = EmptyPagePolicy::Skip;
        }
        config
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = args.pipeline_config();

    match &args.command {
        Command::ExtractText => {
            let summary = pipeline::extract_text(&config)?;
            for (_, path) in &summary.written {
                println!("{}", path.display());
            }
        }
        Command::IdentifySections { report } => {
            let path = pipeline::identify_sections(&config, report)?;
            println!("{}", path.display());
        }
        Command::ExtractKpis { report } => {
            let (csv_path, json_path) = pipeline::extract_kpis(&config, report)?;
            println!("{}", csv_path.display());
            println!("{}", json_path.display());
        }
        Command::BuildOutputs { report } => {
            let outputs = pipeline::build_outputs(&config, report)?;
            println!("{}", outputs.risks_path.display());
            println!("{}", outputs.checklist_path.display());
        }
        Command::Run => {
            let reports = pipeline::run_all(&config)?;
            tracing::info!("Processed {} reports", reports.len());
            for artifacts in &reports {
                for path in [
                    &artifacts.sections_path,
                    &artifacts.kpi_csv_path,
                    &artifacts.kpi_json_path,
                    &artifacts.outputs.risks_path,
                    &artifacts.outputs.checklist_path,
                ] {
                    println!("{}", path.display());
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            if e.is_missing_input() {
                eprintln!("Run the earlier stage first, or point --processed-dir/--output-dir at its artifacts.");
            }
            ExitCode::FAILURE
        }
    }
}
