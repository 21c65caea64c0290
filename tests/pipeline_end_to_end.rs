// tests/pipeline_end_to_end.rs
use filing_kpi_extractor::document::parse_pages;
use filing_kpi_extractor::pipeline;
use filing_kpi_extractor::storage::CHECKLIST_PLACEHOLDER;
use filing_kpi_extractor::{KpiCandidate, KpiName, PipelineConfig, SectionList};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

const TWO_PAGE_REPORT: &str =
    "Page 1: Overview\nRevenue was $1.5 million this year.\x0CPage 2: Risk Factors\nOur business faces significant risks.";

fn setup(root: &Path) -> PipelineConfig {
    let raw = root.join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join("mock_report.txt"), TWO_PAGE_REPORT).unwrap();
    PipelineConfig::new(raw, root.join("processed"), root.join("output"))
}

#[test]
fn two_page_report_produces_sections_kpis_and_risks() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let reports = pipeline::run_all(&config).unwrap();
    assert_eq!(reports.len(), 1);
    let artifacts = &reports[0];
    assert_eq!(artifacts.report, "mock_report");

    // Sections
    let list: SectionList = serde_json::from_str(&fs::read_to_string(&artifacts.sections_path).unwrap()).unwrap();
    let summary: Vec<(&str, u32, u32)> =
        list.sections.iter().map(|s| (s.title.as_str(), s.start_page, s.end_page)).collect();
    assert_eq!(summary, vec![("Overview", 1, 1), ("Risk Factors", 2, 2)]);
    assert_eq!(list.page_count, 2);

    // KPI candidates
    let kpis: Vec<KpiCandidate> = serde_json::from_str(&fs::read_to_string(&artifacts.kpi_json_path).unwrap()).unwrap();
    assert_eq!(kpis.len(), 1);
    assert_eq!(kpis[0].kpi_name, KpiName::Revenue);
    assert_eq!(kpis[0].raw_value_string, "$1.5 million");
    assert_eq!(kpis[0].parsed_value, Some(1_500_000.0));
    assert_eq!(kpis[0].source_page, 1);
    assert!(kpis[0].validation_required.get());

    let csv = fs::read_to_string(&artifacts.kpi_csv_path).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.lines().nth(1).unwrap().starts_with("Revenue,"));

    // Risk text and checklist
    let risks = fs::read_to_string(&artifacts.outputs.risks_path).unwrap();
    assert!(risks.starts_with("# RAW RISK FACTORS - HUMAN CLASSIFICATION REQUIRED"));
    assert!(risks.contains("--- Section: Risk Factors (Page 2) ---"));
    assert!(risks.contains("Our business faces significant risks."));
    assert!(artifacts.outputs.risk_section_found);
    assert!(artifacts.outputs.checklist_created);
    assert_eq!(fs::read_to_string(&artifacts.outputs.checklist_path).unwrap(), CHECKLIST_PLACEHOLDER);
}

#[test]
fn every_reference_points_at_a_page_holding_the_text() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let artifacts = pipeline::run_all(&config).unwrap().remove(0);

    let pages = parse_pages(&fs::read_to_string(&artifacts.text_path).unwrap());
    let page_text = |n: u32| pages.iter().find(|p| p.page_number == n).map(|p| p.text.as_str());

    let list: SectionList = serde_json::from_str(&fs::read_to_string(&artifacts.sections_path).unwrap()).unwrap();
    for section in &list.sections {
        assert!(page_text(section.start_page).unwrap().contains(&section.title));
    }

    let kpis: Vec<KpiCandidate> = serde_json::from_str(&fs::read_to_string(&artifacts.kpi_json_path).unwrap()).unwrap();
    for kpi in &kpis {
        assert!(page_text(kpi.source_page).unwrap().contains(&kpi.raw_value_string));
    }
}

#[test]
fn rerunning_outputs_keeps_analyst_checklist() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let artifacts = pipeline::run_all(&config).unwrap().remove(0);

    let checklist = &artifacts.outputs.checklist_path;
    fs::write(checklist, "- [x] Revenue $1.5 million confirmed").unwrap();

    let outputs = pipeline::build_outputs(&config, "mock_report").unwrap();
    assert!(!outputs.checklist_created);
    assert_eq!(fs::read_to_string(checklist).unwrap(), "- [x] Revenue $1.5 million confirmed");
}

#[test]
fn report_without_risk_section_gets_warning_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(dir.path().join("raw"), dir.path().join("processed"), dir.path().join("output"));
    fs::create_dir_all(&config.processed_dir).unwrap();
    fs::write(
        config.processed_dir.join("short.txt"),
        "--- PAGE 1 ---\nPage 1: Overview\nNet Income was $900,000.\n",
    )
    .unwrap();

    pipeline::identify_sections(&config, "short").unwrap();
    pipeline::extract_kpis(&config, "short").unwrap();
    let outputs = pipeline::build_outputs(&config, "short").unwrap();

    assert!(!outputs.risk_section_found);
    assert_eq!(
        fs::read_to_string(outputs.risks_path).unwrap(),
        "# WARNING: Risk Factors section not found in the document."
    );
}
