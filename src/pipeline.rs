// src/pipeline.rs
//
// One function per stage. Each stage reads the artifact the previous stage
// wrote, so stages can be run one invocation at a time or chained by `run_all`.

use crate::config::PipelineConfig;
use crate::document::PageExtractor;
use crate::extractors::{KpiScanner, RiskAggregator, SectionSegmenter};
use crate::storage::StorageManager;
use crate::utils::error::{AppError, StorageError};
use std::path::{Path, PathBuf};

/// Outcome of a batch text extraction.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// (report name, processed text path) per document that succeeded.
    pub written: Vec<(String, PathBuf)>,
    /// (document, reason) per document that failed.
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone)]
pub struct FinalOutputs {
    pub risks_path: PathBuf,
    pub risk_section_found: bool,
    pub checklist_path: PathBuf,
    pub checklist_created: bool,
}

#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub report: String,
    pub text_path: PathBuf,
    pub sections_path: PathBuf,
    pub kpi_csv_path: PathBuf,
    pub kpi_json_path: PathBuf,
    pub outputs: FinalOutputs,
}

/// The report name of a source document: its file stem.
pub fn report_name(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string())
}

// --- Stage 1 ---

/// Extracts page text from every document in the input directory. One bad
/// document is logged and skipped; the stage fails only if nothing succeeded.
pub fn extract_text(config: &PipelineConfig) -> Result<ExtractionSummary, AppError> {
    if !config.input_dir.is_dir() {
        return Err(StorageError::MissingInputArtifact(config.input_dir.clone()).into());
    }
    let storage = StorageManager::from_config(config)?;
    let extractor = PageExtractor::new(config.empty_pages);

    let docs = PageExtractor::find_documents(&config.input_dir)?;
    let mut summary = ExtractionSummary::default();
    if docs.is_empty() {
        tracing::warn!("No documents found in {}", config.input_dir.display());
        return Ok(summary);
    }

    for doc in docs {
        tracing::info!("Processing: {}", doc.display());
        let Some(report) = report_name(&doc) else {
            tracing::warn!("Skipping {}: file name is not valid UTF-8", doc.display());
            summary.failed.push((doc, "file name is not valid UTF-8".to_string()));
            continue;
        };

        let result = extractor
            .extract_pages(&doc)
            .map_err(AppError::from)
            .and_then(|pages| storage.save_page_text(&report, &pages).map_err(AppError::from));

        match result {
            Ok(path) => summary.written.push((report, path)),
            Err(e) => {
                tracing::error!("Failed to process {}: {}", doc.display(), e);
                summary.failed.push((doc, e.to_string()));
            }
        }
    }

    tracing::info!(
        "Text extraction finished. Success: {}, Failures: {}",
        summary.written.len(),
        summary.failed.len()
    );

    if summary.written.is_empty() {
        return Err(AppError::Processing(format!(
            "Failed to extract text from any of {} documents",
            summary.failed.len()
        )));
    }
    Ok(summary)
}

// --- Stage 2 ---

pub fn identify_sections(config: &PipelineConfig, report: &str) -> Result<PathBuf, AppError> {
    let segmenter = SectionSegmenter::new(&config.header_pattern, config.snippet_len)?;
    let storage = StorageManager::from_config(config)?;

    let text = storage.load_page_text(report)?;
    let list = segmenter.segment_text(report, &text);
    if list.sections.is_empty() {
        tracing::warn!("No section headers matched in {}", report);
    }
    Ok(storage.save_sections(&list)?)
}

// --- Stage 3 ---

/// Returns the (csv, json) paths of the KPI mention tables.
pub fn extract_kpis(config: &PipelineConfig, report: &str) -> Result<(PathBuf, PathBuf), AppError> {
    let storage = StorageManager::from_config(config)?;
    let list = storage.load_sections(report)?;

    let candidates = KpiScanner::new(config.context_radius).scan(&list.sections);
    Ok(storage.save_kpis(report, &candidates)?)
}

// --- Stage 4 ---

pub fn build_outputs(config: &PipelineConfig, report: &str) -> Result<FinalOutputs, AppError> {
    let storage = StorageManager::from_config(config)?;
    let list = storage.load_sections(report)?;

    let aggregator = RiskAggregator::new(config.risk_title.clone());
    let extraction = aggregator.locate(&list.sections);
    let risks_path = storage.save_risks(report, &aggregator.render(extraction.as_ref()))?;

    let (checklist_path, checklist_created) = storage.ensure_checklist(report)?;
    tracing::info!("Final outputs generated. Analyst MUST review {}", checklist_path.display());

    Ok(FinalOutputs {
        risks_path,
        risk_section_found: extraction.is_some(),
        checklist_path,
        checklist_created,
    })
}

// --- All Stages ---

/// Runs every stage for every document in the input directory.
pub fn run_all(config: &PipelineConfig) -> Result<Vec<ReportArtifacts>, AppError> {
    let summary = extract_text(config)?;

    let mut artifacts = Vec::with_capacity(summary.written.len());
    for (report, text_path) in summary.written {
        let sections_path = identify_sections(config, &report)?;
        let (kpi_csv_path, kpi_json_path) = extract_kpis(config, &report)?;
        let outputs = build_outputs(config, &report)?;
        tracing::info!("Finished report {}", report);
        artifacts.push(ReportArtifacts {
            report,
            text_path,
            sections_path,
            kpi_csv_path,
            kpi_json_path,
            outputs,
        });
    }
    Ok(artifacts)
}
