//! Content aggregator: flattened tables and pages under section banners.

use crate::page::PAGE_MARKER;
use crate::rule;

pub const TABLES_BANNER: &str = "NOTION DATABASES:";
pub const PAGES_BANNER: &str = "NOTION PAGES:";

/// One combined text with its structural counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedContent {
    pub text: String,
    pub table_present: bool,
    /// `PAGE: ` markers found in the pages section
    pub page_count: usize,
    pub char_count: usize,
    pages_offset: usize,
}

impl AggregatedContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The pages section, from its banner on. Empty without pages.
    pub fn pages_section(&self) -> &str {
        self.text.get(self.pages_offset..).unwrap_or_default()
    }

    /// Titles recovered from the marker lines of the pages section.
    pub fn page_titles(&self) -> Vec<&str> {
        self.pages_section()
            .lines()
            .filter_map(|line| line.strip_prefix(PAGE_MARKER))
            .collect()
    }
}

/// Combine flattened table sections and page sections.
///
/// Empty entries are skipped; a banner is written only for a section with
/// content. Tables come first.
pub fn aggregate<T, P>(tables: &[T], pages: &[P]) -> AggregatedContent
where
    T: AsRef<str>,
    P: AsRef<str>,
{
    let tables: String = tables.iter().map(AsRef::as_ref).collect();
    let pages: String = pages.iter().map(AsRef::as_ref).collect();
    let rule = rule();

    let mut text = String::new();
    let table_present = !tables.is_empty();
    if table_present {
        text.push_str(&format!("{TABLES_BANNER}\n{rule}\n{tables}\n\n"));
    }

    let pages_offset = text.len();
    let mut page_count = 0;
    if !pages.is_empty() {
        page_count = pages.matches(PAGE_MARKER).count();
        text.push_str(&format!("{PAGES_BANNER}\n{rule}\n{pages}"));
    }

    AggregatedContent {
        char_count: text.chars().count(),
        text,
        table_present,
        page_count,
        pages_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageContent;
    use crate::table::table_section;
    use recall_core::workspace::{BlockKind, ContentBlock, Page};

    fn page_section(title: &str) -> String {
        PageContent::from_page(&Page {
            id: title.to_lowercase(),
            title: title.into(),
            url: String::new(),
            last_edited_time: String::new(),
            blocks: vec![ContentBlock::new(BlockKind::Paragraph, "Body")],
        })
        .section()
    }

    #[test]
    fn nothing_to_aggregate() {
        let content = aggregate::<&str, &str>(&[], &[]);
        assert!(content.is_empty());
        assert!(!content.table_present);
        assert_eq!(content.page_count, 0);
        assert_eq!(content.char_count, 0);
        assert!(content.page_titles().is_empty());
    }

    #[test]
    fn page_count_round_trips() {
        for n in 0..6 {
            let pages: Vec<String> = (0..n).map(|i| page_section(&format!("P{i}"))).collect();
            let content = aggregate::<&str, String>(&[], &pages);
            assert_eq!(content.page_count, n);
            assert_eq!(content.page_titles().len(), n);
        }
    }

    #[test]
    fn unmarked_page_text_counts_zero() {
        let content = aggregate::<&str, &str>(&[], &["# P1\n\nBody\n"]);
        assert!(
            content
                .text
                .starts_with(&format!("NOTION PAGES:\n{}\n", "=".repeat(80)))
        );
        assert_eq!(content.page_count, 0);
    }

    #[test]
    fn tables_precede_pages() {
        let tables = [table_section("Database: Tasks\n")];
        let pages = [page_section("Roadmap")];
        let content = aggregate(&tables, &pages);

        assert!(content.table_present);
        assert_eq!(content.page_count, 1);
        assert!(content.text.starts_with(TABLES_BANNER));
        let tables_at = content.text.find(TABLES_BANNER).unwrap();
        let pages_at = content.text.find(PAGES_BANNER).unwrap();
        assert!(tables_at < pages_at);
        assert_eq!(content.text.matches(TABLES_BANNER).count(), 1);
        assert_eq!(content.text.matches(PAGES_BANNER).count(), 1);
        assert_eq!(content.page_titles(), vec!["Roadmap"]);
    }

    #[test]
    fn empty_tables_write_no_banner() {
        let content = aggregate(&["", ""], &[page_section("Only")]);
        assert!(!content.table_present);
        assert!(content.text.starts_with(PAGES_BANNER));
    }

    #[test]
    fn marker_like_table_lines_are_not_pages() {
        let tables = [table_section("Database: Refs\nPAGE: 12\n")];
        let content = aggregate::<String, &str>(&tables, &[]);
        assert_eq!(content.page_count, 0);
        assert!(content.page_titles().is_empty());
    }

    #[test]
    fn char_count_counts_characters() {
        let content = aggregate::<&str, &str>(&[], &["• é"]);
        assert_eq!(content.char_count, content.text.chars().count());
        assert!(content.char_count < content.text.len());
    }
}
