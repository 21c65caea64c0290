// src/document/delimited.rs
//
// Page-delimited text: the flattened form of a page sequence written by the
// extraction stage and read back by segmentation. Each page block starts with
// a `--- PAGE <n> ---` marker line; blocks are separated by a blank line.
// Page text lines that look like a marker are written with a leading `\`,
// which parsing strips again.

use crate::models::PageRecord;
use once_cell::sync::Lazy;
use regex::Regex;

/// Unnumbered delimiter accepted from older processed files.
pub const PAGE_BREAK_MARKER: &str = "--- PAGE BREAK ---";

static PAGE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^--- PAGE (\d+) ---[ \t]*\r?$")
        .expect("Failed to compile PAGE_MARKER_RE")
});

// Marker-shaped body lines, already escaped or not.
static MARKER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\*--- PAGE (?:\d+|BREAK) ---[ \t]*\r?$")
        .expect("Failed to compile MARKER_LINE_RE")
});

pub fn page_marker(page_number: u32) -> String {
    format!("--- PAGE {} ---", page_number)
}

/// Flattens pages into the delimited text form.
pub fn render_pages(pages: &[PageRecord]) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push('\n'); // blank line between blocks
        }
        out.push_str(&page_marker(page.page_number));
        out.push('\n');
        let body = page.text.trim_end();
        if !body.is_empty() {
            out.push_str(&escape_body(body));
            out.push('\n');
        }
    }
    out
}

/// Recovers page records from delimited text.
///
/// Page numbers come from the markers themselves, so a file written with
/// skipped blank pages keeps its true numbering. The result is sorted by
/// page number; a repeated page number keeps its first block.
pub fn parse_pages(blob: &str) -> Vec<PageRecord> {
    let markers: Vec<(usize, usize, &str)> = PAGE_MARKER_RE
        .captures_iter(blob)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?;
            Some((whole.start(), whole.end(), number.as_str()))
        })
        .collect();

    if markers.is_empty() {
        return parse_legacy(blob);
    }

    if !blob[..markers[0].0].trim().is_empty() {
        tracing::warn!("Ignoring {} bytes of text before the first page marker", markers[0].0);
    }

    let mut pages = Vec::with_capacity(markers.len());
    for (i, &(_, body_start, number)) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map(|m| m.0).unwrap_or(blob.len());
        let page_number = match number.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::warn!("Skipping page block with invalid page number '{}'", number);
                continue;
            }
        };
        pages.push(PageRecord::new(page_number, block_body(&blob[body_start..body_end])));
    }

    let before = pages.len();
    pages.sort_by_key(|p| p.page_number);
    pages.dedup_by_key(|p| p.page_number);
    if pages.len() < before {
        tracing::warn!("Dropped {} page blocks with repeated page numbers", before - pages.len());
    }
    pages
}

// Strips the marker's own line ending and the trailing block separator.
fn block_body(raw: &str) -> String {
    let body = raw
        .strip_prefix("\r\n")
        .or_else(|| raw.strip_prefix('\n'))
        .unwrap_or(raw);
    unescape_body(body.trim_end_matches(|c| c == '\r' || c == '\n'))
}

fn escape_body(body: &str) -> String {
    body.split('\n')
        .map(|line| {
            if MARKER_LINE_RE.is_match(line) {
                format!("\\{}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_body(body: &str) -> String {
    body.split('\n')
        .map(|line| match line.strip_prefix('\\') {
            Some(rest) if MARKER_LINE_RE.is_match(line) => rest,
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_legacy(blob: &str) -> Vec<PageRecord> {
    if blob.contains(PAGE_BREAK_MARKER) {
        tracing::debug!("No numbered page markers found, splitting on '{}'", PAGE_BREAK_MARKER);
        return blob
            .split(PAGE_BREAK_MARKER)
            .enumerate()
            .map(|(i, chunk)| {
                let text = chunk.trim_matches(|c| c == '\r' || c == '\n');
                PageRecord::new(i as u32 + 1, text)
            })
            .collect();
    }

    if blob.trim().is_empty() {
        return Vec::new();
    }
    tracing::warn!("No page markers found, treating the whole text as page 1");
    vec![PageRecord::new(1, blob.trim_end())]
}
