//! Keyword rule table
//!
//! Each rule maps a keyword set to a page type. Rules are ordered by
//! priority (lowest value wins) and a lookup only considers the page types
//! the caller allows, so overlap handling such as "schematic beats layout"
//! lives in the table instead of in nested conditionals.
//!
//! Matching is plain substring search on upper-cased text.

use super::types::PageType;

/// One row of the rule table
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub page_type: PageType,
    pub keywords: &'static [&'static str],
    pub priority: u8,
}

impl KeywordRule {
    /// `text` must already be upper-cased
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| text.contains(kw))
    }
}

pub const INDEX_KEYWORDS: &[&str] = &[
    "DRAWING INDEX",
    "INDEX",
    "TABLE OF CONTENTS",
    "CONTENTS",
    "DRAWING LIST",
];

pub const PID_KEYWORDS: &[&str] = &[
    "SCHEMATIC",
    "SCHEMATICS",
    "P&ID",
    "P&I",
    "PIPING AND INSTRUMENTATION",
    "FLOW DIAGRAM",
];

pub const LEGEND_KEYWORDS: &[&str] = &["LEGEND", "SYMBOL", "STANDARD DETAIL", "KEY"];

pub const LAYOUT_KEYWORDS: &[&str] = &[
    "LAYOUT",
    "PLAN",
    "ELEVATION",
    "SECTION",
    "DETAIL",
    "GA",
    "GENERAL ARRANGEMENT",
    "PLANTROOM",
];

/// Sorted by ascending priority
pub const RULES: [KeywordRule; 4] = [
    KeywordRule {
        page_type: PageType::Index,
        keywords: INDEX_KEYWORDS,
        priority: 0,
    },
    KeywordRule {
        page_type: PageType::Pid,
        keywords: PID_KEYWORDS,
        priority: 1,
    },
    KeywordRule {
        page_type: PageType::Legend,
        keywords: LEGEND_KEYWORDS,
        priority: 2,
    },
    KeywordRule {
        page_type: PageType::Layout,
        keywords: LAYOUT_KEYWORDS,
        priority: 3,
    },
];

/// Types an index entry title can resolve to
pub const ENTRY_TYPES: &[PageType] = &[PageType::Pid, PageType::Legend, PageType::Layout];

/// Types a whole page can resolve to during the title scan
pub const PAGE_TITLE_TYPES: &[PageType] = &[PageType::Index, PageType::Pid, PageType::Layout];

/// Highest-priority allowed rule matching `text`, or [`PageType::Unknown`]
pub fn resolve(text: &str, allowed: &[PageType]) -> PageType {
    RULES
        .iter()
        .filter(|rule| allowed.contains(&rule.page_type))
        .find(|rule| rule.matches(text))
        .map(|rule| rule.page_type)
        .unwrap_or(PageType::Unknown)
}

/// Classify an index entry by its title
pub fn classify_entry_name(name: &str) -> PageType {
    resolve(&name.to_uppercase(), ENTRY_TYPES)
}

/// Classify a page by its full (upper-cased) text
pub fn classify_page_text(text: &str) -> PageType {
    resolve(text, PAGE_TITLE_TYPES)
}

/// Does `text` (upper-cased) look like a drawing index?
pub fn is_index_text(text: &str) -> bool {
    RULES[0].matches(text)
}
