// src/extractors/section.rs

// --- Imports ---
use crate::config::{DEFAULT_HEADER_PATTERN, DEFAULT_SNIPPET_LEN};
use crate::document::parse_pages;
use crate::models::{PageRecord, SectionList, SectionRecord};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
static DEFAULT_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_HEADER_PATTERN).expect("Failed to compile DEFAULT_HEADER_RE")
});

// --- Segmenter ---

/// Splits a page sequence into titled sections. A page starts a section when
/// its text matches the header pattern; other pages extend the section before.
#[derive(Debug, Clone)]
pub struct SectionSegmenter {
    header_re: Regex,
    snippet_len: usize,
}

impl SectionSegmenter {
    /// `pattern` must contain a capture group; the first group is the title.
    pub fn new(pattern: &str, snippet_len: usize) -> Result<Self, ExtractError> {
        let header_re = Regex::new(pattern)
            .map_err(|e| ExtractError::InvalidHeaderPattern(format!("'{}': {}", pattern, e)))?;
        // captures_len() counts the implicit whole-match group.
        if header_re.captures_len() < 2 {
            return Err(ExtractError::InvalidHeaderPattern(format!(
                "'{}' has no capture group for the section title",
                pattern
            )));
        }
        Ok(Self { header_re, snippet_len })
    }

    /// First header match on the page, if any.
    pub fn detect_title(&self, page_text: &str) -> Option<String> {
        let caps = self.header_re.captures(page_text)?;
        let title = caps.get(1)?.as_str().trim().to_string();
        Some(title)
    }

    pub fn segment(&self, pages: &[PageRecord]) -> Vec<SectionRecord> {
        let mut ordered: Vec<&PageRecord> = pages.iter().collect();
        ordered.sort_by_key(|p| p.page_number);
        ordered.dedup_by_key(|p| p.page_number);

        let Some(last_page) = ordered.last().map(|p| p.page_number) else {
            return Vec::new();
        };

        let mut sections: Vec<SectionRecord> = Vec::new();
        for page in ordered {
            let Some(title) = self.detect_title(&page.text) else {
                tracing::trace!("Page {} has no section header", page.page_number);
                continue;
            };
            tracing::debug!("Section '{}' starts on page {}", title, page.page_number);

            if let Some(previous) = sections.last_mut() {
                previous.end_page = page.page_number - 1;
            }
            sections.push(SectionRecord {
                title,
                start_page: page.page_number,
                end_page: last_page,
                text_snippet: snippet(&page.text, self.snippet_len),
                page_text: page.text.clone(),
            });
        }

        tracing::info!("Identified {} sections across {} pages", sections.len(), pages.len());
        sections
    }

    /// Segments page-delimited text and wraps the result as a section list.
    pub fn segment_text(&self, report_name: &str, delimited: &str) -> SectionList {
        let pages = parse_pages(delimited);
        let sections = self.segment(&pages);
        SectionList {
            report_name: report_name.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            // Pages come back sorted; skipped blank pages still count.
            page_count: pages.last().map(|p| p.page_number).unwrap_or(0),
            sections,
        }
    }
}

impl Default for SectionSegmenter {
    fn default() -> Self {
        Self { header_re: DEFAULT_HEADER_RE.clone(), snippet_len: DEFAULT_SNIPPET_LEN }
    }
}

/// Bounded single-line preview of a page.
fn snippet(text: &str, max_chars: usize) -> String {
    let preview: String = text
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{}...", preview)
}
