//! MemoryStore trait: owner-scoped conversational memory.
//!
//! The store keeps two kinds of entries for each owner: conversation turns
//! and content snapshots (a full rendered workspace dump). Snapshots are told
//! apart by [`SNAPSHOT_PREFIX`] and are never surfaced as conversation.

use crate::error::StoreError;
use crate::message::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Leading text of every stored content snapshot.
pub const SNAPSHOT_PREFIX: &str = "Notion Knowledge Base Content:";

/// A single memory held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned identifier
    pub id: String,

    /// The remembered text
    pub text: String,

    /// Owner key the record belongs to
    pub owner: String,

    /// When the store created the record, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Relevance score (set by search operations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl MemoryRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            owner: owner.into(),
            created_at: None,
            score: None,
        }
    }

    /// Whether this record is a content snapshot rather than a conversation turn.
    pub fn is_snapshot(&self) -> bool {
        is_snapshot(&self.text)
    }
}

/// Whether `text` is a stored content snapshot.
pub fn is_snapshot(text: &str) -> bool {
    text.starts_with(SNAPSHOT_PREFIX)
}

/// One role-tagged message handed to [`MemoryStore::add`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// The system turn that stores `content` as a snapshot.
    pub fn snapshot(content: &str) -> Self {
        Self::new(Role::System, format!("{SNAPSHOT_PREFIX}\n{content}"))
    }
}

/// The core MemoryStore trait.
///
/// Implementations: Mem0 cloud, in-memory (for testing and offline runs).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "mem0", "in_memory").
    fn name(&self) -> &str;

    /// Memories relevant to `query`, most relevant first.
    async fn search(
        &self,
        query: &str,
        owner: &str,
        limit: usize,
    ) -> std::result::Result<Vec<MemoryRecord>, StoreError>;

    /// Persist a batch of turns under `owner`.
    async fn add(&self, turns: &[Turn], owner: &str) -> std::result::Result<(), StoreError>;

    /// Every memory held for `owner`, oldest first.
    async fn get_all(&self, owner: &str) -> std::result::Result<Vec<MemoryRecord>, StoreError>;

    /// Remove every memory held for `owner`.
    async fn delete_all(&self, owner: &str) -> std::result::Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_turn_carries_prefix() {
        let turn = Turn::snapshot("NOTION PAGES:\n...");
        assert_eq!(turn.role, Role::System);
        assert!(is_snapshot(&turn.content));
        assert!(turn.content.starts_with("Notion Knowledge Base Content:\nNOTION PAGES:"));
    }

    #[test]
    fn conversation_record_is_not_snapshot() {
        let rec = MemoryRecord::new("m1", "User likes tea", "user_ada");
        assert!(!rec.is_snapshot());
        let snap = MemoryRecord::new("m2", SNAPSHOT_PREFIX, "user_ada");
        assert!(snap.is_snapshot());
    }

    #[test]
    fn record_serialization_skips_absent_fields() {
        let rec = MemoryRecord::new("m1", "text", "user_ada");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("score"));
        assert!(!json.contains("created_at"));
    }
}
