//! Text and section extraction
//!
//! A section starts at the first occurrence of a start marker and runs up to
//! the first occurrence of an end marker after it, or to the end of the
//! document when there is no end marker. Markers match case-sensitively.

use std::ops::RangeInclusive;

use crate::document::PageSource;

/// Text of the first `limit` pages (all pages when `None`), in page order.
///
/// A page whose text cannot be extracted reads as empty.
pub async fn page_texts(source: &dyn PageSource, limit: Option<usize>) -> Vec<String> {
    let total_pages = source.page_count();
    let count = limit.map_or(total_pages, |limit| limit.min(total_pages));

    let mut pages = Vec::with_capacity(count);
    for page_index in 0..count {
        let text = match source.page_text(page_index).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(
                    page = page_index + 1,
                    error = %e,
                    "Text extraction failed, treating page as blank"
                );
                String::new()
            }
        };
        pages.push(text);
    }

    pages
}

/// Concatenate page texts; every non-empty page ends with a newline
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages.iter().filter(|p| !p.is_empty()) {
        text.push_str(page);
        text.push('\n');
    }
    text
}

/// The part of `text` from `start` up to, but excluding, `end`.
///
/// `None` when the start marker does not occur. A missing or empty end
/// marker extends the section to the end of the text.
pub fn section_text<'a>(text: &'a str, start: &str, end: Option<&str>) -> Option<&'a str> {
    let from = text.find(start)?;
    let rest = &text[from..];

    let len = end
        .filter(|marker| !marker.is_empty())
        .and_then(|marker| rest.find(marker))
        .unwrap_or(rest.len());

    Some(&rest[..len])
}

/// 1-based page numbers spanned by a section.
///
/// The first page is the first one containing `start`. The last page is the
/// first page from there on containing `end` (the start page itself
/// included), or the last page of the document.
pub fn section_pages(
    pages: &[String],
    start: &str,
    end: Option<&str>,
) -> Option<RangeInclusive<usize>> {
    let first = pages.iter().position(|page| page.contains(start))?;

    let last = end
        .filter(|marker| !marker.is_empty())
        .and_then(|marker| pages[first..].iter().position(|page| page.contains(marker)))
        .map_or(pages.len() - 1, |offset| first + offset);

    Some(first + 1..=last + 1)
}
