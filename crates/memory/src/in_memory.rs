//! In-memory store: useful for testing and offline sessions.

use async_trait::async_trait;
use chrono::Utc;
use recall_core::error::StoreError;
use recall_core::memory::{MemoryRecord, MemoryStore, Turn};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-memory store that keeps every turn as its own record.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Total records across all owners.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased query words long enough to carry meaning.
fn keywords(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(
        &self,
        query: &str,
        owner: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let words = keywords(query);
        let entries = self.entries.read().await;

        let mut results: Vec<MemoryRecord> = entries
            .iter()
            .filter(|e| e.owner == owner)
            .filter_map(|e| {
                let text = e.text.to_lowercase();
                let hits = words.iter().filter(|w| text.contains(w.as_str())).count();
                (hits > 0).then(|| {
                    let mut e = e.clone();
                    e.score = Some(hits as f32 / words.len() as f32);
                    e
                })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn add(&self, turns: &[Turn], owner: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        for turn in turns {
            let mut record = MemoryRecord::new(Uuid::new_v4().to_string(), &turn.content, owner);
            record.created_at = Some(Utc::now());
            entries.push(record);
        }
        Ok(())
    }

    async fn get_all(&self, owner: &str) -> Result<Vec<MemoryRecord>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| e.owner == owner).cloned().collect())
    }

    async fn delete_all(&self, owner: &str) -> Result<(), StoreError> {
        self.entries.write().await.retain(|e| e.owner != owner);
        Ok(())
    }
}
