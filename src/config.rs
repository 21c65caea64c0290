// src/config.rs
use std::path::PathBuf;

// --- Defaults ---
pub const DEFAULT_HEADER_PATTERN: &str = r"Page \d+: (.*)";
pub const DEFAULT_CONTEXT_RADIUS: usize = 50;
pub const DEFAULT_SNIPPET_LEN: usize = 100;
pub const DEFAULT_RISK_TITLE: &str = "Risk Factors";

/// What to do with a page whose text layer is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPagePolicy {
    /// Keep the page as an empty-text record so page numbers have no gaps.
    #[default]
    Retain,
    /// Drop the page from the output.
    Skip,
}

/// Everything a stage needs to know about where to read and write.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source documents for page extraction.
    pub input_dir: PathBuf,
    /// Page-delimited text artifacts.
    pub processed_dir: PathBuf,
    /// Per-report section, KPI and risk artifacts.
    pub output_dir: PathBuf,
    /// Must contain at least one capture group; the first one is the title.
    pub header_pattern: String,
    pub context_radius: usize,
    pub snippet_len: usize,
    pub risk_title: String,
    pub empty_pages: EmptyPagePolicy,
}

impl PipelineConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            processed_dir: processed_dir.into(),
            output_dir: output_dir.into(),
            header_pattern: DEFAULT_HEADER_PATTERN.to_string(),
            context_radius: DEFAULT_CONTEXT_RADIUS,
            snippet_len: DEFAULT_SNIPPET_LEN,
            risk_title: DEFAULT_RISK_TITLE.to_string(),
            empty_pages: EmptyPagePolicy::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("./data/raw", "./data/processed", "./output")
    }
}
