//! Sequential content loading with per-item failure isolation.
//!
//! Items are fetched one at a time. A failing page is recorded and skipped;
//! everything fetched before and after it still reaches the aggregate.

use crate::aggregate::{AggregatedContent, aggregate};
use crate::page::PageContent;
use crate::table::{flatten, table_section};
use recall_core::error::WorkspaceError;
use recall_core::workspace::{PageSummary, WorkspaceProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Page,
    Table,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Page => "page",
            ItemKind::Table => "database",
        }
    }
}

/// Progress reported while loading, one pair of events per item.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Started {
        kind: ItemKind,
        /// 1-based position
        index: usize,
        total: usize,
        title: String,
    },
    Loaded {
        kind: ItemKind,
        index: usize,
    },
    Failed {
        kind: ItemKind,
        index: usize,
        reason: String,
    },
}

/// Title of the failure recorded when the database listing itself fails.
pub const LISTING_TITLE: &str = "database listing";

/// An item that could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
    pub reason: String,
}

/// Everything one load produced.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub content: AggregatedContent,
    pub pages: Vec<PageContent>,
    pub tables_loaded: usize,
    pub failures: Vec<LoadFailure>,
}

/// Drives a [`WorkspaceProvider`] through listing and fetching.
pub struct ContentLoader {
    provider: Arc<dyn WorkspaceProvider>,
}

impl ContentLoader {
    pub fn new(provider: Arc<dyn WorkspaceProvider>) -> Self {
        Self { provider }
    }

    pub async fn list_pages(&self) -> Result<Vec<PageSummary>, WorkspaceError> {
        self.provider.list_pages().await
    }

    /// Fetch and flatten the given pages in order.
    pub async fn load_pages(
        &self,
        pages: &[PageSummary],
        progress: &mut dyn FnMut(LoadEvent),
    ) -> (Vec<PageContent>, Vec<LoadFailure>) {
        let total = pages.len();
        let mut loaded = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (i, summary) in pages.iter().enumerate() {
            let index = i + 1;
            progress(LoadEvent::Started {
                kind: ItemKind::Page,
                index,
                total,
                title: summary.title.clone(),
            });

            let outcome = match self.provider.get_page(&summary.id).await {
                Ok(Some(page)) => Ok(PageContent::from_page(&page)),
                Ok(None) => Err(WorkspaceError::NotFound(format!("page {}", summary.id))),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(content) => {
                    debug!(page = %summary.id, chars = content.char_count, "Page loaded");
                    loaded.push(content);
                    progress(LoadEvent::Loaded {
                        kind: ItemKind::Page,
                        index,
                    });
                }
                Err(e) => {
                    warn!(page = %summary.id, error = %e, "Failed to load page");
                    progress(LoadEvent::Failed {
                        kind: ItemKind::Page,
                        index,
                        reason: e.to_string(),
                    });
                    failures.push(LoadFailure {
                        kind: ItemKind::Page,
                        id: summary.id.clone(),
                        title: summary.title.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (loaded, failures)
    }

    /// Fetch and flatten every table the provider lists, framed for the
    /// aggregate. A listing failure yields no tables and a single failure.
    pub async fn load_tables(
        &self,
        progress: &mut dyn FnMut(LoadEvent),
    ) -> (Vec<String>, Vec<LoadFailure>) {
        let summaries = match self.provider.list_tables().await {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!(error = %e, "Failed to list databases");
                let failure = LoadFailure {
                    kind: ItemKind::Table,
                    id: String::new(),
                    title: LISTING_TITLE.into(),
                    reason: e.to_string(),
                };
                return (Vec::new(), vec![failure]);
            }
        };

        let total = summaries.len();
        let mut sections = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (i, summary) in summaries.iter().enumerate() {
            let index = i + 1;
            progress(LoadEvent::Started {
                kind: ItemKind::Table,
                index,
                total,
                title: summary.title.clone(),
            });

            let outcome = match self.provider.get_table(&summary.id).await {
                Ok(Some(table)) => Ok(table),
                Ok(None) => Err(WorkspaceError::NotFound(format!("database {}", summary.id))),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(table) => {
                    debug!(database = %summary.id, records = table.records.len(), "Database loaded");
                    sections.push(table_section(&flatten(&table)));
                    progress(LoadEvent::Loaded {
                        kind: ItemKind::Table,
                        index,
                    });
                }
                Err(e) => {
                    warn!(database = %summary.id, error = %e, "Failed to load database");
                    progress(LoadEvent::Failed {
                        kind: ItemKind::Table,
                        index,
                        reason: e.to_string(),
                    });
                    failures.push(LoadFailure {
                        kind: ItemKind::Table,
                        id: summary.id.clone(),
                        title: summary.title.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (sections, failures)
    }

    /// Load the selected pages, and every table when `include_tables`, then
    /// aggregate whatever succeeded.
    pub async fn load(
        &self,
        include_tables: bool,
        pages: &[PageSummary],
        progress: &mut dyn FnMut(LoadEvent),
    ) -> LoadReport {
        let (tables, mut failures) = if include_tables {
            self.load_tables(progress).await
        } else {
            (Vec::new(), Vec::new())
        };
        let (loaded, page_failures) = self.load_pages(pages, progress).await;
        failures.extend(page_failures);

        let sections: Vec<String> = loaded.iter().map(PageContent::section).collect();
        let content = aggregate(&tables, &sections);
        info!(
            databases = tables.len(),
            pages = content.page_count,
            chars = content.char_count,
            failures = failures.len(),
            "Workspace content loaded"
        );

        LoadReport {
            content,
            pages: loaded,
            tables_loaded: tables.len(),
            failures,
        }
    }
}
