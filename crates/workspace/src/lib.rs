//! Workspace content for notion-recall: fetching pages and tables from
//! Notion and flattening them into prompt-ready text.
//!
//! Pipeline, leaf first:
//!
//! 1. [`render`]: one block to one line of Markdown-like text
//! 2. [`page`]: a page's blocks to a single normalized text
//! 3. [`table`]: typed records to a textual table
//! 4. [`aggregate`]: tables and pages under section banners, with counters
//!
//! [`loader`] drives the fetches one item at a time so a failing page does
//! not cost the ones already loaded.

pub mod aggregate;
pub mod loader;
pub mod notion;
pub mod page;
pub mod render;
pub mod selection;
pub mod table;

pub use aggregate::{AggregatedContent, aggregate};
pub use loader::{ContentLoader, ItemKind, LISTING_TITLE, LoadEvent, LoadFailure, LoadReport};
pub use notion::NotionClient;
pub use page::{PageContent, flatten_page};
pub use render::render;
pub use selection::parse_selection;
pub use table::{flatten_table, table_section};

use recall_config::WorkspaceConfig;
use recall_core::error::WorkspaceError;
use recall_core::workspace::WorkspaceProvider;
use std::sync::Arc;

/// Build the workspace provider described by `config`.
///
/// Returns `None` without a token: workspace features are then disabled
/// while chat keeps working.
pub fn connect(
    config: &WorkspaceConfig,
) -> Result<Option<Arc<dyn WorkspaceProvider>>, WorkspaceError> {
    let Some(token) = config.token.as_deref() else {
        return Ok(None);
    };
    let client = NotionClient::new(
        token,
        &config.base_url,
        &config.notion_version,
        config.page_size,
    )?;
    Ok(Some(Arc::new(client)))
}

/// Width of the `=` rules framing sections and items.
pub const RULE_WIDTH: usize = 80;

pub(crate) fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}
