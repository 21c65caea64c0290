// src/document/sources.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use scraper::{node::Node, ElementRef, Html};
use std::path::Path;

// --- Format Detection ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Html,
    PlainText,
}

impl DocumentFormat {
    /// Picks a reader from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "htm" | "html" => Some(DocumentFormat::Html),
            "txt" => Some(DocumentFormat::PlainText),
            _ => None,
        }
    }

    pub fn source(self) -> &'static dyn PageSource {
        match self {
            DocumentFormat::Pdf => &PdfSource,
            DocumentFormat::Html => &HtmlSource,
            DocumentFormat::PlainText => &PlainTextSource,
        }
    }
}

/// A reader that turns one document into raw page texts, in source order.
/// Index 0 of the result is page 1. Pages without text come back as empty strings.
pub trait PageSource {
    fn name(&self) -> &'static str;
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError>;
}

fn read_error(path: &Path, reason: impl ToString) -> ExtractError {
    ExtractError::DocumentRead { path: path.to_path_buf(), reason: reason.to_string() }
}

// --- PDF ---

pub struct PdfSource;

impl PageSource for PdfSource {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let doc = lopdf::Document::load(path).map_err(|e| {
            let msg = e.to_string();
            let lower = msg.to_lowercase();
            if lower.contains("encrypt") || lower.contains("password") {
                ExtractError::EncryptedDocument(path.to_path_buf())
            } else {
                read_error(path, msg)
            }
        })?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        tracing::debug!("{} has {} pages", path.display(), page_numbers.len());

        let mut texts = Vec::with_capacity(page_numbers.len());
        for page_number in page_numbers {
            match doc.extract_text(&[page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    // Unreadable content streams are treated like a missing text layer.
                    tracing::warn!("Could not extract text from page {} of {}: {}", page_number, path.display(), e);
                    texts.push(String::new());
                }
            }
        }
        Ok(texts)
    }
}

// --- HTML ---

/// Reads HTML filings, splitting pages on CSS page-break styles the way
/// EDGAR documents mark printed page boundaries.
pub struct HtmlSource;

impl HtmlSource {
    pub fn pages_from_html(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut acc = PageAccumulator::default();
        walk_element(document.root_element(), &mut acc);
        acc.finish()
    }
}

impl PageSource for HtmlSource {
    fn name(&self) -> &'static str {
        "html"
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let html = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        Ok(Self::pages_from_html(&html))
    }
}

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "tr", "li", "table", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
];
// Table cells end with a word break so adjacent figures stay separate.
const CELL_TAGS: &[&str] = &["td", "th"];
const SKIPPED_TAGS: &[&str] = &["script", "style", "head"];

#[derive(Default)]
struct PageAccumulator {
    pages: Vec<String>,
    current: String,
    pending_space: bool,
}

impl PageAccumulator {
    // Collapses whitespace runs (including &nbsp;) to a single space.
    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && !self.current.is_empty() && !self.current.ends_with('\n') {
                self.current.push(' ');
            }
            self.pending_space = false;
            self.current.push(c);
        }
    }

    fn end_line(&mut self) {
        self.pending_space = false;
        if !self.current.is_empty() && !self.current.ends_with('\n') {
            self.current.push('\n');
        }
    }

    // Consecutive breaks never produce an empty page.
    fn break_page(&mut self) {
        if self.current.trim().is_empty() {
            self.current.clear();
            return;
        }
        let page = std::mem::take(&mut self.current);
        self.pages.push(page.trim().to_string());
    }

    fn finish(mut self) -> Vec<String> {
        self.break_page();
        self.pages
    }
}

fn style_of(element: &ElementRef) -> String {
    element
        .value()
        .attr("style")
        .map(|s| s.to_ascii_lowercase().chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default()
}

fn walk_element(element: ElementRef, acc: &mut PageAccumulator) {
    let tag = element.value().name();
    if SKIPPED_TAGS.contains(&tag) {
        return;
    }
    let style = style_of(&element);
    let is_block = BLOCK_TAGS.contains(&tag);

    if style.contains("page-break-before:always") || style.contains("break-before:page") {
        acc.end_line();
        acc.break_page();
    }
    if is_block {
        acc.end_line();
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text_node) => acc.push_text(&text_node.text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    walk_element(child_el, acc);
                }
            }
            _ => {} // Ignore comments, etc.
        }
    }

    if is_block {
        acc.end_line();
    } else if CELL_TAGS.contains(&tag) {
        acc.pending_space = true;
    }
    if style.contains("page-break-after:always") || style.contains("break-after:page") {
        acc.end_line();
        acc.break_page();
    }
}

// --- Plain Text ---

/// Reads plain text, one page per form-feed separated chunk.
pub struct PlainTextSource;

impl PlainTextSource {
    pub fn pages_from_text(text: &str) -> Vec<String> {
        let mut pages: Vec<String> = text.split('\x0C').map(|p| p.to_string()).collect();
        // A trailing form feed closes the last page rather than opening a new one.
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        pages
    }
}

impl PageSource for PlainTextSource {
    fn name(&self) -> &'static str {
        "text"
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let text = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        Ok(Self::pages_from_text(&text))
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("a/10k.PDF")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("filing.htm")), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("notes.txt")), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("sheet.xlsx")), None);
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("README")), None);
    }

    #[test]
    fn test_form_feed_pages() {
        let pages = PlainTextSource::pages_from_text("one\x0Ctwo\x0C\x0Cfour\x0C");
        assert_eq!(pages, vec!["one", "two", "", "four"]);
    }

    #[test]
    fn test_html_page_breaks() {
        let html = r#"<html><head><style>p { color: red; }</style></head><body>
            <p>Page 1: Overview</p>
            <p>Revenue was <b>$1.5 million</b> this year.</p>
            <hr style="page-break-after: always"/>
            <div style="PAGE-BREAK-BEFORE:always"><p>Page 2: Risk Factors</p>
            <p>Our business&nbsp;faces risks.</p></div>
            <hr style="page-break-after:always">
            </body></html>"#;
        let pages = HtmlSource::pages_from_html(html);
        assert_eq!(pages.len(), 2, "pages: {:?}", pages);
        assert_eq!(pages[0], "Page 1: Overview\nRevenue was $1.5 million this year.");
        assert_eq!(pages[1], "Page 2: Risk Factors\nOur business faces risks.");
    }

    #[test]
    fn test_html_without_breaks_is_one_page() {
        let pages = HtmlSource::pages_from_html("<body><h2>Item 7</h2><p>Text</p></body>");
        assert_eq!(pages, vec!["Item 7\nText"]);
    }

    #[test]
    fn test_html_table_cells_are_separated() {
        let html = "<table><tr><th>Fiscal 2023</th><th>45%</th></tr>\
                    <tr><td>Revenue</td><td>$1,200</td><td>$900</td></tr></table>";
        let pages = HtmlSource::pages_from_html(html);
        assert_eq!(pages, vec!["Fiscal 2023 45%\nRevenue $1,200 $900"]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = PlainTextSource.read_pages(Path::new("/nonexistent/doc.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::DocumentRead { .. }));
    }
}
