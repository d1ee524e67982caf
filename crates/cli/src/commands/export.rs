//! `recall export`: Write flattened pages to text files.

use recall_agent::session::preview;
use recall_core::workspace::PageSummary;
use recall_workspace::{ContentLoader, LoadEvent, PageContent, aggregate, parse_selection};
use std::path::{Path, PathBuf};

/// Default file for a combined export of every page.
pub const ALL_PAGES_FILE: &str = "all_notion_pages.txt";

const PREVIEW_CHARS: usize = 500;

pub async fn run(selection: &str, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let loader = ContentLoader::new(super::require_workspace(&config)?);

    let pages = loader.list_pages().await?;
    let indices = parse_selection(selection, pages.len())?;
    if indices.is_empty() {
        println!("No pages selected (found {} pages).", pages.len());
        return Ok(());
    }
    let selected: Vec<PageSummary> = indices.iter().map(|&i| pages[i].clone()).collect();

    let (loaded, failures) = loader
        .load_pages(&selected, &mut |event| {
            if let LoadEvent::Started {
                index,
                total,
                title,
                ..
            } = event
            {
                println!("Processing page {index}/{total}: {title}");
            }
        })
        .await;
    for failure in &failures {
        eprintln!("  Skipped '{}': {}", failure.title, failure.reason);
    }

    let combined =
        selection.trim().eq_ignore_ascii_case("all") || (output.is_some() && loaded.len() > 1);
    for written in write_export(&loaded, combined, output.as_deref())? {
        println!("Saved: {}", written.path.display());
        println!("  Words: {}  Characters: {}", written.words, written.chars);
        println!("\nPreview:\n{}\n", preview(&written.text, PREVIEW_CHARS));
    }

    Ok(())
}

/// One file written by an export.
pub struct Written {
    pub path: PathBuf,
    pub text: String,
    pub words: usize,
    pub chars: usize,
}

/// Write `pages` to disk.
///
/// Combined exports write every page section into one file (`output`, or
/// [`ALL_PAGES_FILE`]). Otherwise each page gets its own file with a
/// metadata header, named after its title.
pub fn write_export(
    pages: &[PageContent],
    combined: bool,
    output: Option<&Path>,
) -> std::io::Result<Vec<Written>> {
    if pages.is_empty() {
        return Ok(Vec::new());
    }

    if combined || (pages.len() == 1 && output.is_some()) {
        let text = if pages.len() == 1 && !combined {
            pages[0].export_text()
        } else {
            let sections: Vec<String> = pages.iter().map(PageContent::section).collect();
            aggregate::<&str, String>(&[], &sections).text
        };
        let path = output.map_or_else(|| PathBuf::from(ALL_PAGES_FILE), Path::to_path_buf);
        std::fs::write(&path, &text)?;
        return Ok(vec![Written {
            path,
            words: pages.iter().map(|p| p.word_count).sum(),
            chars: text.chars().count(),
            text,
        }]);
    }

    pages
        .iter()
        .map(|page| {
            let path = PathBuf::from(page.export_filename());
            let text = page.export_text();
            std::fs::write(&path, &text)?;
            Ok(Written {
                path,
                text,
                words: page.word_count,
                chars: page.char_count,
            })
        })
        .collect()
}
