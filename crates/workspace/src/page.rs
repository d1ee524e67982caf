//! Page flattener and the per-page content it produces.

use crate::rule;
use crate::render::render;
use recall_core::workspace::{ContentBlock, Page};
use regex::Regex;
use std::sync::LazyLock;

/// Marker opening every page section; the aggregator counts pages by it.
pub const PAGE_MARKER: &str = "PAGE: ";

/// Width of the rule under an exported page's header.
pub const EXPORT_RULE_WIDTH: usize = 60;

/// Three or more newlines, possibly with whitespace-only lines between.
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Anything but word characters, whitespace, and hyphens; Unicode-aware.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

static FILENAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Flatten a page's blocks into one normalized text.
///
/// Emits `# {title}` and a blank line, then every top-level block rendered
/// at depth 0. Runs of blank lines collapse to one, the result is trimmed
/// and terminated by a single newline. Flattening never emits the
/// [`PAGE_MARKER`] itself; see [`PageContent::section`].
pub fn flatten_page(title: &str, blocks: &[ContentBlock]) -> String {
    let raw = blocks.iter().fold(format!("# {title}\n\n"), |mut out, block| {
        out.push_str(&render(block, 0));
        out
    });
    let collapsed = collapse_blank_runs(&raw);
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

pub(crate) fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

/// Stop page text from forging an extra page marker.
fn neutralize_marker(text: &str) -> String {
    text.replace(PAGE_MARKER, "PAGE:\u{a0}")
}

/// A flattened page with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub id: String,
    pub title: String,
    pub url: String,
    pub last_edited_time: String,
    /// Output of [`flatten_page`]
    pub body: String,
    pub word_count: usize,
    pub char_count: usize,
}

impl PageContent {
    pub fn from_page(page: &Page) -> Self {
        let body = flatten_page(&page.title, &page.blocks);
        let counted = body.trim_end();
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            url: page.url.clone(),
            last_edited_time: page.last_edited_time.clone(),
            word_count: counted.split_whitespace().count(),
            char_count: counted.chars().count(),
            body,
        }
    }

    /// The page framed for aggregation: a rule, the `PAGE: ` marker line,
    /// another rule, then the body. Exactly one marker per section.
    pub fn section(&self) -> String {
        let rule = rule();
        let title = neutralize_marker(&self.title.replace(['\n', '\r'], " "));
        format!(
            "\n{rule}\n{PAGE_MARKER}{title}\n{rule}\n{}\n",
            neutralize_marker(&self.body)
        )
    }

    /// Text written by `export`: a metadata header, a rule, then the body.
    pub fn export_text(&self) -> String {
        let last_edited = if self.last_edited_time.is_empty() {
            "Unknown"
        } else {
            &self.last_edited_time
        };
        format!(
            "Title: {}\nLast Edited: {last_edited}\nWord Count: {}\nCharacter Count: {}\n{}\n\n{}",
            self.title,
            self.word_count,
            self.char_count,
            "=".repeat(EXPORT_RULE_WIDTH),
            self.body
        )
    }

    /// Default export filename, `notion_content_<safe_title>.txt`.
    pub fn export_filename(&self) -> String {
        format!("notion_content_{}.txt", safe_file_stem(&self.title))
    }
}

/// Drop everything but word characters, spaces, and dashes, then join the
/// remaining words with underscores.
pub fn safe_file_stem(title: &str) -> String {
    let kept = UNSAFE_FILENAME_CHARS.replace_all(title, "");
    let joined = FILENAME_SEPARATORS.replace_all(&kept, "_");
    match joined.trim_matches('_') {
        "" => "untitled".to_string(),
        stem => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::workspace::BlockKind;

    fn sample_blocks() -> Vec<ContentBlock> {
        vec![
            ContentBlock::new(BlockKind::Heading1, "Title"),
            ContentBlock::new(BlockKind::Paragraph, "Hello"),
            ContentBlock::new(BlockKind::Divider, ""),
            ContentBlock::new(BlockKind::BulletedItem, "Item A"),
        ]
    }

    fn page(title: &str, blocks: Vec<ContentBlock>) -> Page {
        Page {
            id: "p1".into(),
            title: title.into(),
            url: "https://notion.so/p1".into(),
            last_edited_time: "2024-03-01T10:00:00.000Z".into(),
            blocks,
        }
    }

    #[test]
    fn flatten_matches_reference_output() {
        assert_eq!(
            flatten_page("Page", &sample_blocks()),
            "# Page\n\n# Title\nHello\n\n---\n• Item A\n"
        );
    }

    #[test]
    fn flatten_never_has_three_newlines() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Heading1, "A"),
            ContentBlock::new(BlockKind::Divider, ""),
            ContentBlock::new(BlockKind::Heading2, "B"),
            ContentBlock::new(BlockKind::Paragraph, ""),
            ContentBlock::new(BlockKind::Paragraph, "   "),
            ContentBlock::new(BlockKind::Paragraph, ""),
            ContentBlock::new(BlockKind::Divider, ""),
            ContentBlock::new(BlockKind::Heading3, "C"),
            ContentBlock::new(BlockKind::Paragraph, "line\n\n\n\nwith gaps"),
        ];
        let flat = flatten_page("Gaps", &blocks);
        assert!(!flat.contains("\n\n\n"), "{flat:?}");
    }

    #[test]
    fn flatten_is_idempotent_under_collapse() {
        let flat = flatten_page("Page", &sample_blocks());
        assert_eq!(collapse_blank_runs(&flat), flat);
    }

    #[test]
    fn flatten_empty_page_is_just_title() {
        assert_eq!(flatten_page("Empty", &[]), "# Empty\n");
    }

    #[test]
    fn flatten_does_not_emit_marker() {
        assert!(!flatten_page("Page", &sample_blocks()).contains(PAGE_MARKER));
    }

    #[test]
    fn page_metrics() {
        let content = PageContent::from_page(&page("Page", sample_blocks()));
        // "# Page # Title Hello --- • Item A"
        assert_eq!(content.word_count, 9);
        assert_eq!(content.char_count, content.body.trim_end().chars().count());
    }

    #[test]
    fn section_carries_one_marker() {
        let content = PageContent::from_page(&page(
            "Notes",
            vec![ContentBlock::new(BlockKind::Paragraph, "see PAGE: 4 of the manual")],
        ));
        let section = content.section();
        assert_eq!(section.matches(PAGE_MARKER).count(), 1);
        assert!(section.contains("PAGE: Notes\n"));
        assert!(section.contains("see PAGE:\u{a0}4"));
    }

    #[test]
    fn section_marker_line_survives_odd_titles() {
        let content = PageContent::from_page(&page("PAGE: one\ntwo", vec![]));
        let section = content.section();
        assert_eq!(section.matches(PAGE_MARKER).count(), 1);
        assert!(section.contains("PAGE: PAGE:\u{a0}one two\n"));
    }

    #[test]
    fn export_header() {
        let content = PageContent::from_page(&page("Q3 Plan", sample_blocks()));
        let text = content.export_text();
        assert!(text.starts_with("Title: Q3 Plan\nLast Edited: 2024-03-01T10:00:00.000Z\n"));
        assert!(text.contains(&format!("Word Count: {}\n", content.word_count)));
        assert!(text.contains(&format!("{}\n\n# Q3 Plan", "=".repeat(60))));
    }

    #[test]
    fn export_filenames() {
        let content = PageContent::from_page(&page("Q3 Plan: Draft #2", vec![]));
        assert_eq!(content.export_filename(), "notion_content_Q3_Plan_Draft_2.txt");
        assert_eq!(safe_file_stem("a - b"), "a_b");
        assert_eq!(safe_file_stem("???"), "untitled");
    }

    #[test]
    fn file_stem_keeps_non_ascii_letters() {
        assert_eq!(safe_file_stem("Café notes"), "Café_notes");
        assert_eq!(safe_file_stem("会议记录"), "会议记录");
        assert_eq!(safe_file_stem("日本語メモ"), "日本語メモ");
        assert_ne!(safe_file_stem("会议记录"), safe_file_stem("日本語メモ"));
    }
}
