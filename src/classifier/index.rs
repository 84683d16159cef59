//! Drawing index parsing
//!
//! An index line looks like `M602 MECHANICAL PIPEWORK SCHEMATICS`, possibly
//! with several code/title pairs on one line. A title runs from the
//! whitespace after its code up to the next code or the end of the line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::classify_entry_name;
use super::types::{ClassificationMethod, ClassificationResult, DrawingEntry};

/// Titles shorter than this many characters are treated as noise
const MIN_TITLE_LEN: usize = 6;

/// One letter followed by 2-4 digits, as a whole word
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]\d{2,4})\b").expect("valid drawing code regex"));

/// Whitespace followed by a code; marks the end of the previous title
static NEXT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[A-Z]\d{2,4}").expect("valid next code regex"));

/// Extract drawing entries from upper-cased index page text
pub fn parse_index_text(text: &str) -> Vec<DrawingEntry> {
    text.split('\n').flat_map(parse_index_line).collect()
}

fn parse_index_line(line: &str) -> Vec<DrawingEntry> {
    let mut entries = Vec::new();
    let trimmed_len = line.trim_end().len();
    let mut pos = 0;

    while let Some(caps) = CODE_RE.captures_at(line, pos) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            break;
        };

        let rest = &line[whole.end()..];
        let title_start = whole.end() + (rest.len() - rest.trim_start().len());

        // A code must be followed by whitespace and at least one more character
        if title_start == whole.end() || title_start >= line.len() {
            pos = whole.end();
            continue;
        }

        let min_end = title_start
            + line[title_start..]
                .chars()
                .next()
                .map_or(0, char::len_utf8);
        let line_end = trimmed_len.max(min_end);
        let title_end = NEXT_CODE_RE
            .find_at(line, min_end)
            .map_or(line_end, |m| m.start().min(line_end));

        let title = line[title_start..title_end].trim();
        if title.chars().count() >= MIN_TITLE_LEN {
            entries.push(DrawingEntry {
                number: code.as_str().to_string(),
                name: title.to_string(),
                page_type: classify_entry_name(title),
            });
        }

        pos = title_end;
    }

    entries
}

/// Map index entries onto the pages that follow the index page
///
/// Entry `i` lands on page `index_page + 1 + i`; entries past the last page
/// are dropped. Legend entries occupy a page but are not listed.
pub fn classify_from_index(
    total_pages: usize,
    index_page: usize,
    entries: &[DrawingEntry],
) -> ClassificationResult {
    let mut result = ClassificationResult::new(total_pages, ClassificationMethod::Index);
    result.index_page = Some(index_page);

    for (page_number, entry) in (index_page + 1..=total_pages).zip(entries) {
        result.push(page_number, entry.page_type);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::types::PageType;

    fn names(entries: &[DrawingEntry]) -> Vec<(&str, &str)> {
        entries
            .iter()
            .map(|e| (e.number.as_str(), e.name.as_str()))
            .collect()
    }

    #[test]
    fn test_single_entry_per_line() {
        let entries = parse_index_text("DRAWING INDEX\nM602 MECHANICAL PIPEWORK SCHEMATICS\n");

        assert_eq!(names(&entries), vec![("M602", "MECHANICAL PIPEWORK SCHEMATICS")]);
        assert_eq!(entries[0].page_type, PageType::Pid);
    }

    #[test]
    fn test_multiple_entries_per_line() {
        let entries = parse_index_text("M601 GROUND FLOOR PLAN   M602 BOILER SCHEMATIC");

        assert_eq!(
            names(&entries),
            vec![("M601", "GROUND FLOOR PLAN"), ("M602", "BOILER SCHEMATIC")]
        );
        assert_eq!(entries[0].page_type, PageType::Layout);
        assert_eq!(entries[1].page_type, PageType::Pid);
    }

    #[test]
    fn test_short_titles_discarded() {
        let entries = parse_index_text("M100 REV A\nM101 NOTES\nM102 GENERAL NOTES");
        assert_eq!(names(&entries), vec![("M102", "GENERAL NOTES")]);
    }

    #[test]
    fn test_code_without_title_ignored() {
        assert!(parse_index_text("M100\nH2000   \nREVISION").is_empty());
    }

    #[test]
    fn test_code_shapes() {
        // Too many digits, lower case and glued suffixes are not codes
        let entries = parse_index_text("M12345 PUMP SCHEDULE\nm100 PUMP SCHEDULE\nM100X PUMP SCHEDULE");
        assert!(entries.is_empty());

        let entries = parse_index_text("E10 LIGHTING LAYOUT");
        assert_eq!(names(&entries), vec![("E10", "LIGHTING LAYOUT")]);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let entries = parse_index_text("H201 HEATING SCHEMATIC    \r");
        assert_eq!(names(&entries), vec![("H201", "HEATING SCHEMATIC")]);
    }

    #[test]
    fn test_non_ascii_titles() {
        let entries = parse_index_text("M300 PLANTA GENERAL ÁREA TÉCNICA");
        assert_eq!(names(&entries), vec![("M300", "PLANTA GENERAL ÁREA TÉCNICA")]);
    }

    #[test]
    fn test_title_length_counts_characters() {
        // Five characters, six bytes
        assert!(parse_index_text("M300 ÁREAS").is_empty());

        let entries = parse_index_text("M301 ÁREAS2");
        assert_eq!(names(&entries), vec![("M301", "ÁREAS2")]);
    }

    #[test]
    fn test_classify_from_index_maps_following_pages() {
        let entries = parse_index_text(
            "DRAWING INDEX\n\
             M600 SYMBOLS LEGEND\n\
             M601 GROUND FLOOR PLAN\n\
             M602 MECHANICAL PIPEWORK SCHEMATICS\n\
             M603 COVER SHEET TEXT",
        );
        assert_eq!(entries.len(), 4);

        let result = classify_from_index(10, 2, &entries);

        assert_eq!(result.index_page, Some(2));
        assert_eq!(result.layout_pages, vec![4]);
        assert_eq!(result.pid_pages, vec![5]);
        assert_eq!(result.unknown_pages, vec![6]);
        assert_eq!(result.method_used, ClassificationMethod::Index);
    }

    #[test]
    fn test_classify_from_index_truncates_at_last_page() {
        let entries = parse_index_text("M601 BOILER SCHEMATIC\nM602 CHILLER SCHEMATIC\nM603 ROOF PLAN VIEW");

        let result = classify_from_index(2, 1, &entries);

        assert_eq!(result.pid_pages, vec![2]);
        assert!(result.layout_pages.is_empty());
        assert!(result.unknown_pages.is_empty());
    }
}
