// src/extractors/kpi.rs

// --- Imports ---
use crate::config::DEFAULT_CONTEXT_RADIUS;
use crate::extractors::value::parse_value;
use crate::models::{KpiCandidate, KpiName, SectionRecord};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Currency amounts ($1.5 million, $1,234,567, $ 42) or bare percentages (45%, 12.5%).
// A comma joins the figure only when a digit follows it, so the whole token is
// kept ("$1,00,000") while trailing punctuation never is ("$2,000.").
static KPI_MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$\s?[0-9](?:,?[0-9])*(?:\.[0-9]+)?(?:\s*(?:thousand|million|billion)\b)?|\b[0-9]+(?:\.[0-9]+)?%",
    )
    .expect("Failed to compile KPI_MENTION_RE")
});

// --- Classification ---

/// Condition checked against a mention's context window and raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionPredicate {
    SnippetContains(&'static str),
    ValueIsPercentage,
}

impl MentionPredicate {
    pub fn matches(&self, snippet: &str, raw_value: &str) -> bool {
        match self {
            MentionPredicate::SnippetContains(keyword) => snippet.contains(keyword),
            MentionPredicate::ValueIsPercentage => raw_value.contains('%'),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub predicate: MentionPredicate,
    pub label: KpiName,
}

/// Evaluated top to bottom; the first rule that matches names the mention.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule { predicate: MentionPredicate::SnippetContains("Revenue"), label: KpiName::Revenue },
    ClassificationRule { predicate: MentionPredicate::SnippetContains("Net Income"), label: KpiName::NetIncome },
    ClassificationRule { predicate: MentionPredicate::SnippetContains("EBITDA"), label: KpiName::AdjustedEbitda },
    ClassificationRule { predicate: MentionPredicate::ValueIsPercentage, label: KpiName::GrowthRate },
];

pub fn classify(snippet: &str, raw_value: &str) -> KpiName {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.predicate.matches(snippet, raw_value))
        .map(|rule| rule.label)
        .unwrap_or(KpiName::FinancialMetric)
}

// --- Scanner ---

/// Finds numeric mentions in each section's start-page text and turns every
/// one into a candidate. Nothing is de-duplicated; review happens downstream.
#[derive(Debug, Clone)]
pub struct KpiScanner {
    context_radius: usize,
}

impl KpiScanner {
    pub fn new(context_radius: usize) -> Self {
        Self { context_radius }
    }

    pub fn scan(&self, sections: &[SectionRecord]) -> Vec<KpiCandidate> {
        let candidates: Vec<KpiCandidate> = sections
            .iter()
            .flat_map(|section| self.scan_page(&section.page_text, section.start_page))
            .collect();
        let unparsed = candidates.iter().filter(|c| c.parsed_value.is_none()).count();
        tracing::info!(
            "Found {} KPI candidates in {} sections ({} need manual values)",
            candidates.len(),
            sections.len(),
            unparsed
        );
        candidates
    }

    pub fn scan_page(&self, page_text: &str, page_number: u32) -> Vec<KpiCandidate> {
        KPI_MENTION_RE
            .find_iter(page_text)
            .map(|mat| {
                let raw_value = mat.as_str().trim().to_string();
                let snippet = context_window(page_text, mat.start(), mat.end(), self.context_radius);
                let kpi_name = classify(&snippet, &raw_value);
                let parsed = parse_value(&raw_value);
                tracing::debug!("Page {}: '{}' -> {} ({:?})", page_number, raw_value, kpi_name, parsed);
                KpiCandidate::new(kpi_name, snippet, raw_value, parsed, page_number)
            })
            .collect()
    }
}

impl Default for KpiScanner {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_RADIUS)
    }
}

/// Up to `radius` characters either side of `start..end`, on one line.
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to]
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
