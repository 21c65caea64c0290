// src/storage/mod.rs
use crate::config::PipelineConfig;
use crate::document::render_pages;
use crate::models::{KpiCandidate, PageRecord, SectionList};
use crate::utils::error::StorageError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

// --- Artifact Names ---
pub const SECTIONS_FILE: &str = "sections.json";
pub const KPI_CSV_FILE: &str = "kpi_mentions.csv";
pub const KPI_JSON_FILE: &str = "kpi_mentions.json";
pub const RISKS_FILE: &str = "risks_raw.txt";
pub const CHECKLIST_FILE: &str = "VALIDATION_REQUIRED.txt";

pub const CHECKLIST_PLACEHOLDER: &str = "# VALIDATION REQUIRED - CHECKLIST MISSING";

/// Column order of the tabular KPI artifact; matches `KpiCandidate` field order.
pub const KPI_COLUMNS: [&str; 7] = [
    "kpi_name",
    "raw_text_snippet",
    "raw_value_string",
    "parsed_value",
    "source_page",
    "validation_required",
    "metric_type",
];

/// Reads and writes every pipeline artifact. Layout:
/// `<processed>/<report>.txt` and `<output>/<report>/{sections.json, kpi_mentions.*, ...}`.
pub struct StorageManager {
    processed_dir: PathBuf,
    output_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager, creating both roots if they don't exist
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(processed_dir: P, output_dir: Q) -> Result<Self, StorageError> {
        let processed_dir = processed_dir.as_ref().to_path_buf();
        let output_dir = output_dir.as_ref().to_path_buf();
        ensure_dir(&processed_dir)?;
        ensure_dir(&output_dir)?;
        Ok(Self { processed_dir, output_dir })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, StorageError> {
        Self::new(&config.processed_dir, &config.output_dir)
    }

    // --- Paths ---

    pub fn processed_text_path(&self, report: &str) -> PathBuf {
        self.processed_dir.join(format!("{}.txt", report))
    }

    pub fn report_dir(&self, report: &str) -> PathBuf {
        self.output_dir.join(report)
    }

    pub fn sections_path(&self, report: &str) -> PathBuf {
        self.report_dir(report).join(SECTIONS_FILE)
    }

    pub fn kpi_csv_path(&self, report: &str) -> PathBuf {
        self.report_dir(report).join(KPI_CSV_FILE)
    }

    pub fn kpi_json_path(&self, report: &str) -> PathBuf {
        self.report_dir(report).join(KPI_JSON_FILE)
    }

    pub fn risks_path(&self, report: &str) -> PathBuf {
        self.report_dir(report).join(RISKS_FILE)
    }

    pub fn checklist_path(&self, report: &str) -> PathBuf {
        self.report_dir(report).join(CHECKLIST_FILE)
    }

    // --- Page Text ---

    /// Writes the page-delimited text for one document.
    pub fn save_page_text(&self, report: &str, pages: &[PageRecord]) -> Result<PathBuf, StorageError> {
        let file_path = self.processed_text_path(report);
        fs::write(&file_path, render_pages(pages))?;
        tracing::info!("Saved {} pages to {}", pages.len(), file_path.display());
        Ok(file_path)
    }

    pub fn load_page_text(&self, report: &str) -> Result<String, StorageError> {
        let file_path = self.processed_text_path(report);
        require(&file_path)?;
        Ok(fs::read_to_string(&file_path)?)
    }

    // --- Sections ---

    pub fn save_sections(&self, list: &SectionList) -> Result<PathBuf, StorageError> {
        ensure_dir(&self.report_dir(&list.report_name))?;
        let file_path = self.sections_path(&list.report_name);
        fs::write(&file_path, serde_json::to_string_pretty(list)?)?;
        tracing::info!("Saved {} sections to {}", list.sections.len(), file_path.display());
        Ok(file_path)
    }

    pub fn load_sections(&self, report: &str) -> Result<SectionList, StorageError> {
        let file_path = self.sections_path(report);
        require(&file_path)?;
        let raw = fs::read_to_string(&file_path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    // --- KPI Mentions ---

    /// Writes the same candidates as CSV and as JSON. Returns (csv, json) paths.
    pub fn save_kpis(&self, report: &str, candidates: &[KpiCandidate]) -> Result<(PathBuf, PathBuf), StorageError> {
        ensure_dir(&self.report_dir(report))?;

        let csv_path = self.kpi_csv_path(report);
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&csv_path)?;
        // Header written by hand so an empty scan still yields a well-formed table.
        writer.write_record(KPI_COLUMNS)?;
        for candidate in candidates {
            writer.serialize(candidate)?;
        }
        writer.flush()?;
        tracing::info!("Saved {} KPI mentions to {}", candidates.len(), csv_path.display());

        let json_path = self.kpi_json_path(report);
        fs::write(&json_path, serde_json::to_string_pretty(candidates)?)?;
        tracing::info!("Saved {} KPI mentions to {}", candidates.len(), json_path.display());

        Ok((csv_path, json_path))
    }

    // --- Risk Output ---

    pub fn save_risks(&self, report: &str, content: &str) -> Result<PathBuf, StorageError> {
        ensure_dir(&self.report_dir(report))?;
        let file_path = self.risks_path(report);
        fs::write(&file_path, content)?;
        tracing::info!("Saved raw risk factors to {}", file_path.display());
        Ok(file_path)
    }

    /// Makes sure the validation checklist exists. An existing file is never
    /// touched. Returns the path and whether the placeholder was just created.
    pub fn ensure_checklist(&self, report: &str) -> Result<(PathBuf, bool), StorageError> {
        ensure_dir(&self.report_dir(report))?;
        let file_path = self.checklist_path(report);
        let created = write_new_file(&file_path, |file| file.write_all(CHECKLIST_PLACEHOLDER.as_bytes()))?;
        if created {
            tracing::warn!("{} not found, re-created a placeholder", file_path.display());
        }
        Ok((file_path, created))
    }
}

/// Creates `path` and fills it with `write`, leaving an existing file alone.
/// A failed write removes the new file so the next run tries again.
fn write_new_file<F>(path: &Path, write: F) -> Result<bool, StorageError>
where
    F: FnOnce(&mut fs::File) -> std::io::Result<()>,
{
    let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(StorageError::IoError(e)),
    };
    if let Err(e) = write(&mut file) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            tracing::error!("Could not remove partial file {}: {}", path.display(), remove_err);
        }
        return Err(StorageError::IoError(e));
    }
    Ok(true)
}

fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn require(path: &Path) -> Result<(), StorageError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StorageError::MissingInputArtifact(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KpiName, SectionRecord};
    use pretty_assertions::assert_eq;

    fn storage() -> (tempfile::TempDir, StorageManager) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("processed"), dir.path().join("output")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_page_text_written_under_report_stem() {
        let (_dir, storage) = storage();
        let path = storage.save_page_text("acme_10k", &[PageRecord::new(1, "hello")]).unwrap();
        assert!(path.ends_with("processed/acme_10k.txt"));
        assert_eq!(storage.load_page_text("acme_10k").unwrap(), "--- PAGE 1 ---\nhello\n");
    }

    #[test]
    fn test_missing_inputs_are_reported_with_path() {
        let (_dir, storage) = storage();
        match storage.load_page_text("absent") {
            Err(StorageError::MissingInputArtifact(path)) => assert!(path.ends_with("absent.txt")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(storage.load_sections("absent"), Err(StorageError::MissingInputArtifact(_))));
    }

    #[test]
    fn test_sections_round_trip() {
        let (_dir, storage) = storage();
        let list = SectionList {
            report_name: "acme".into(),
            generated_at: "2024-01-01T00:00:00+00:00".into(),
            page_count: 1,
            sections: vec![SectionRecord {
                title: "Overview".into(),
                start_page: 1,
                end_page: 1,
                text_snippet: "Page 1: Overview...".into(),
                page_text: "Page 1: Overview".into(),
            }],
        };
        storage.save_sections(&list).unwrap();
        assert_eq!(storage.load_sections("acme").unwrap(), list);
    }

    #[test]
    fn test_kpi_csv_and_json_agree() {
        let (_dir, storage) = storage();
        let candidates = vec![
            KpiCandidate::new(KpiName::Revenue, "Revenue, up \"sharply\"".into(), "$1.5 million".into(), Some(1_500_000.0), 1),
            KpiCandidate::new(KpiName::FinancialMetric, "odd".into(), "$1.2.3".into(), None, 2),
        ];
        let (csv_path, json_path) = storage.save_kpis("acme", &candidates).unwrap();

        let csv = fs::read_to_string(csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], KPI_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            r#"Revenue,"Revenue, up ""sharply""",$1.5 million,1500000.0,1,true,GAAP/Other"#
        );
        assert_eq!(lines[2], "Financial Metric,odd,$1.2.3,,2,true,GAAP/Other");

        let json: Vec<KpiCandidate> = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json, candidates);
    }

    #[test]
    fn test_empty_kpi_table_has_header() {
        let (_dir, storage) = storage();
        let (csv_path, json_path) = storage.save_kpis("empty", &[]).unwrap();
        assert_eq!(fs::read_to_string(csv_path).unwrap().trim_end(), KPI_COLUMNS.join(","));
        assert_eq!(fs::read_to_string(json_path).unwrap(), "[]");
    }

    #[test]
    fn test_checklist_is_created_once_and_never_overwritten() {
        let (_dir, storage) = storage();
        let (path, created) = storage.ensure_checklist("acme").unwrap();
        assert!(created);
        assert_eq!(fs::read_to_string(&path).unwrap(), CHECKLIST_PLACEHOLDER);

        fs::write(&path, "- [x] Revenue confirmed").unwrap();
        let (_, created_again) = storage.ensure_checklist("acme").unwrap();
        assert!(!created_again);
        assert_eq!(fs::read_to_string(&path).unwrap(), "- [x] Revenue confirmed");
    }

    #[test]
    fn test_failed_checklist_write_leaves_no_file() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.report_dir("acme")).unwrap();
        let path = storage.checklist_path("acme");

        let result = write_new_file(&path, |_| Err(std::io::Error::new(ErrorKind::Other, "disk full")));
        assert!(matches!(result, Err(StorageError::IoError(_))));
        assert!(!path.exists());

        let (_, created) = storage.ensure_checklist("acme").unwrap();
        assert!(created);
        assert_eq!(fs::read_to_string(&path).unwrap(), CHECKLIST_PLACEHOLDER);
    }
}
