// src/document/mod.rs
pub mod delimited;
pub mod sources;

use crate::config::EmptyPagePolicy;
use crate::models::PageRecord;
use crate::utils::error::ExtractError;
use std::path::{Path, PathBuf};

// Re-export key page extraction types for convenience
pub use delimited::{page_marker, parse_pages, render_pages, PAGE_BREAK_MARKER};
pub use sources::{DocumentFormat, HtmlSource, PageSource, PdfSource, PlainTextSource};

/// Turns a source document into its ordered page records.
pub struct PageExtractor {
    empty_pages: EmptyPagePolicy,
}

impl PageExtractor {
    pub fn new(empty_pages: EmptyPagePolicy) -> Self {
        Self { empty_pages }
    }

    pub fn extract_pages(&self, path: &Path) -> Result<Vec<PageRecord>, ExtractError> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| ExtractError::UnsupportedFormat(path.to_path_buf()))?;
        let source = format.source();
        tracing::debug!("Reading {} with the {} reader", path.display(), source.name());

        let raw_pages = source.read_pages(path)?;
        Ok(self.into_records(path, raw_pages))
    }

    /// Numbers raw page texts from 1 and applies the empty-page policy.
    pub fn into_records(&self, path: &Path, raw_pages: Vec<String>) -> Vec<PageRecord> {
        let mut pages = Vec::with_capacity(raw_pages.len());
        for (idx, text) in raw_pages.into_iter().enumerate() {
            let page = PageRecord::new(idx as u32 + 1, text);
            if !page.is_blank() {
                pages.push(page);
                continue;
            }
            match self.empty_pages {
                EmptyPagePolicy::Retain => {
                    tracing::warn!("Page {} of {} has no extractable text, keeping it as an empty page", page.page_number, path.display());
                    pages.push(PageRecord::new(page.page_number, String::new()));
                }
                EmptyPagePolicy::Skip => {
                    tracing::warn!("Page {} of {} has no extractable text, skipping it", page.page_number, path.display());
                }
            }
        }
        pages
    }

    /// Lists readable documents in `dir`, sorted by file name.
    pub fn find_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut docs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if DocumentFormat::from_path(&path).is_some() {
                docs.push(path);
            } else {
                tracing::debug!("Skipping unsupported file {}", path.display());
            }
        }
        docs.sort();
        Ok(docs)
    }
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new(EmptyPagePolicy::default())
    }
}
