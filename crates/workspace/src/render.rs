//! Block renderer: one content block to Markdown-like text.

use recall_core::workspace::{BlockKind, ContentBlock};

pub const CHECKED_GLYPH: &str = "☑";
pub const UNCHECKED_GLYPH: &str = "☐";

const INDENT: &str = "  ";

/// Render `block` and, one level per recursion, its children.
///
/// Every non-empty line of the block's own text is prefixed with two spaces
/// per `depth`; children render at `depth + 1` after the parent.
pub fn render(block: &ContentBlock, depth: usize) -> String {
    let own = indent(&render_own(block), depth);
    if !block.has_children {
        return own;
    }
    block.children.iter().fold(own, |mut out, child| {
        out.push_str(&render(child, depth + 1));
        out
    })
}

fn render_own(block: &ContentBlock) -> String {
    let text = block.plain_text();
    match &block.kind {
        BlockKind::Heading1 => format!("\n# {text}\n"),
        BlockKind::Heading2 => format!("\n## {text}\n"),
        BlockKind::Heading3 => format!("\n### {text}\n"),
        BlockKind::Paragraph => format!("{text}\n"),
        BlockKind::BulletedItem => format!("• {text}\n"),
        // Ordinals are not tracked
        BlockKind::NumberedItem => format!("1. {text}\n"),
        BlockKind::Checklist { checked } => {
            let glyph = if *checked { CHECKED_GLYPH } else { UNCHECKED_GLYPH };
            format!("{glyph} {text}\n")
        }
        BlockKind::Quote => format!("> {text}\n"),
        BlockKind::Code { language } => format!("```{language}\n{text}\n```\n"),
        BlockKind::Divider => "\n---\n".to_string(),
        BlockKind::Other { .. } => String::new(),
    }
}

fn indent(text: &str, depth: usize) -> String {
    if depth == 0 {
        return text.to_string();
    }
    let prefix = INDENT.repeat(depth);
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim_end_matches('\n').is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: BlockKind, text: &str) -> ContentBlock {
        ContentBlock::new(kind, text)
    }

    #[test]
    fn headings() {
        assert_eq!(render(&block(BlockKind::Heading1, "A"), 0), "\n# A\n");
        assert_eq!(render(&block(BlockKind::Heading2, "B"), 0), "\n## B\n");
        assert_eq!(render(&block(BlockKind::Heading3, "C"), 0), "\n### C\n");
    }

    #[test]
    fn list_items_and_quote() {
        assert_eq!(render(&block(BlockKind::Paragraph, "p"), 0), "p\n");
        assert_eq!(render(&block(BlockKind::BulletedItem, "b"), 0), "• b\n");
        assert_eq!(render(&block(BlockKind::NumberedItem, "third"), 0), "1. third\n");
        assert_eq!(render(&block(BlockKind::Quote, "q"), 0), "> q\n");
    }

    #[test]
    fn checklist_glyphs() {
        let done = block(BlockKind::Checklist { checked: true }, "ship");
        let open = block(BlockKind::Checklist { checked: false }, "test");
        assert_eq!(render(&done, 0), "☑ ship\n");
        assert_eq!(render(&open, 0), "☐ test\n");
    }

    #[test]
    fn code_with_and_without_language() {
        let rust = block(
            BlockKind::Code {
                language: "rust".into(),
            },
            "fn main() {}",
        );
        assert_eq!(render(&rust, 0), "```rust\nfn main() {}\n```\n");
        let plain = block(
            BlockKind::Code {
                language: String::new(),
            },
            "x",
        );
        assert_eq!(render(&plain, 0), "```\nx\n```\n");
    }

    #[test]
    fn divider_ignores_text_runs() {
        let mut divider = block(BlockKind::Divider, "stray text");
        divider.text.push("more".into());
        assert_eq!(render(&divider, 0), "\n---\n");
    }

    #[test]
    fn unknown_kind_renders_nothing() {
        let other = block(
            BlockKind::Other {
                name: "callout".into(),
            },
            "hidden",
        );
        assert_eq!(render(&other, 0), "");
    }

    #[test]
    fn runs_join_without_separator() {
        let mut para = block(BlockKind::Paragraph, "Hello, ");
        para.text.push("world".into());
        assert_eq!(render(&para, 0), "Hello, world\n");
    }

    #[test]
    fn children_indented_after_parent() {
        let parent = block(BlockKind::BulletedItem, "parent").with_children(vec![
            block(BlockKind::BulletedItem, "child one"),
            block(BlockKind::Heading2, "child heading"),
        ]);
        assert_eq!(
            render(&parent, 0),
            "• parent\n  • child one\n\n  ## child heading\n"
        );
    }

    #[test]
    fn child_newline_does_not_indent_next_sibling() {
        let parent = block(BlockKind::Paragraph, "p")
            .with_children(vec![block(BlockKind::Paragraph, "c")]);
        let out = format!("{}{}", render(&parent, 0), render(&block(BlockKind::Paragraph, "next"), 0));
        assert_eq!(out, "p\n  c\nnext\n");
    }

    #[test]
    fn has_children_without_fetched_children() {
        let mut parent = block(BlockKind::Paragraph, "lonely");
        parent.has_children = true;
        assert_eq!(render(&parent, 0), "lonely\n");
    }

    #[test]
    fn depth_indents_own_text() {
        assert_eq!(render(&block(BlockKind::Quote, "q"), 2), "    > q\n");
    }
}
