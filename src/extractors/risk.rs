// src/extractors/risk.rs
use crate::config::DEFAULT_RISK_TITLE;
use crate::models::{RiskExtraction, SectionRecord};

pub const RISK_BANNER: &str = "# RAW RISK FACTORS - HUMAN CLASSIFICATION REQUIRED";

/// Pulls the risk section's raw text out of the section list for manual classification.
#[derive(Debug, Clone)]
pub struct RiskAggregator {
    target_title: String,
}

impl RiskAggregator {
    pub fn new(target_title: impl Into<String>) -> Self {
        Self { target_title: target_title.into() }
    }

    /// First section whose title contains the target (case-sensitive).
    pub fn locate(&self, sections: &[SectionRecord]) -> Option<RiskExtraction> {
        let section = sections.iter().find(|s| s.title.contains(&self.target_title))?;
        tracing::info!("Found '{}' section on page {}", section.title, section.start_page);
        Some(RiskExtraction {
            section_title: section.title.clone(),
            source_page: section.start_page,
            raw_text: section.page_text.clone(),
        })
    }

    /// The human-readable block, or a warning placeholder when nothing was found.
    pub fn render(&self, extraction: Option<&RiskExtraction>) -> String {
        match extraction {
            Some(risk) => format!(
                "{}\n\n--- Section: {} (Page {}) ---\n{}",
                RISK_BANNER,
                risk.section_title,
                risk.source_page,
                risk.raw_text.trim()
            ),
            None => {
                tracing::warn!("{} section not found in the document", self.target_title);
                format!("# WARNING: {} section not found in the document.", self.target_title)
            }
        }
    }
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_TITLE)
    }
}
