//! Workspace content model and the WorkspaceProvider trait.
//!
//! The provider's loosely-typed responses are converted into these closed
//! shapes at the boundary, so the flattening pipeline pattern-matches over a
//! fixed set of block kinds and property values.

use crate::error::WorkspaceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The kind of a content block, with the per-kind data rendering needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    BulletedItem,
    NumberedItem,
    Checklist { checked: bool },
    Quote,
    Code { language: String },
    Divider,
    /// Any block type the renderer has no rule for; carries the raw type name.
    Other { name: String },
}

/// One node of a page's content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub id: String,
    pub kind: BlockKind,
    /// Inline text runs, in order
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub has_children: bool,
    /// Child blocks, fetched one level deep
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentBlock>,
}

impl ContentBlock {
    /// A childless block with a single text run.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            text: vec![text.into()],
            has_children: false,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ContentBlock>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }

    /// The text runs concatenated without separator.
    pub fn plain_text(&self) -> String {
        self.text.concat()
    }
}

/// Listing entry for a page the integration can read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_edited_time: String,
}

impl PageSummary {
    /// The calendar date of the last edit, or `Unknown`.
    pub fn last_edited_date(&self) -> &str {
        match self.last_edited_time.get(..10) {
            Some(date) => date,
            None if self.last_edited_time.is_empty() => "Unknown",
            None => &self.last_edited_time,
        }
    }
}

/// A page with its block content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_edited_time: String,
    pub blocks: Vec<ContentBlock>,
}

/// Listing entry for a table (database) the integration can read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: String,
    pub title: String,
}

/// One schema column: property name and its value-type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: String,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(String),
    List(Vec<String>),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) | PropertyValue::Date(s) => f.write_str(s),
            PropertyValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// One row of a table. Properties absent from the map have no value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub values: HashMap<String, PropertyValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }
}

/// A titled collection of records sharing one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub title: String,
    /// Columns in the provider's declared order
    pub schema: Vec<Column>,
    pub records: Vec<Record>,
}

/// The core WorkspaceProvider trait.
///
/// Implementations: Notion (HTTP), fakes in tests.
#[async_trait]
pub trait WorkspaceProvider: Send + Sync {
    /// The provider name (e.g., "notion").
    fn name(&self) -> &str;

    /// Pages the integration can read.
    async fn list_pages(&self) -> std::result::Result<Vec<PageSummary>, WorkspaceError>;

    /// A page with its blocks, or `None` if it does not exist.
    async fn get_page(&self, id: &str) -> std::result::Result<Option<Page>, WorkspaceError>;

    /// Tables the integration can read.
    async fn list_tables(&self) -> std::result::Result<Vec<TableSummary>, WorkspaceError>;

    /// A table with schema and records, or `None` if it does not exist.
    async fn get_table(&self, id: &str) -> std::result::Result<Option<Table>, WorkspaceError>;
}
