//! Mem0 cloud memory store.
//!
//! Talks to the hosted Mem0 REST API. Every call is scoped by `user_id`,
//! which carries the owner key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recall_core::error::StoreError;
use recall_core::memory::{MemoryRecord, MemoryStore, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A memory store backed by the Mem0 cloud API.
pub struct Mem0Store {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl Mem0Store {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| StoreError::Network(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn memories_url(&self) -> String {
        format!("{}/v1/memories/", self.base_url)
    }

    fn auth(&self) -> String {
        format!("Token {}", self.api_key)
    }

    /// Map non-success statuses to store errors.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(StoreError::Unauthorized(
                "Invalid memory API key or insufficient permissions".into(),
            ));
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Memory store returned error");
            return Err(StoreError::Api {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }

    async fn read_records(response: reqwest::Response) -> Result<Vec<MemoryRecord>, StoreError> {
        let body: ApiRecords = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse memories: {e}")))?;
        Ok(body.into_records())
    }
}

#[async_trait]
impl MemoryStore for Mem0Store {
    fn name(&self) -> &str {
        "mem0"
    }

    async fn search(
        &self,
        query: &str,
        owner: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let url = format!("{}/v1/memories/search/", self.base_url);
        debug!(owner, limit, "Searching memories");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth())
            .json(&SearchBody {
                query,
                user_id: owner,
                limit,
            })
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let records = Self::read_records(Self::check(response).await?).await?;
        debug!(owner, count = records.len(), "Memory search returned");
        Ok(records)
    }

    async fn add(&self, turns: &[Turn], owner: &str) -> Result<(), StoreError> {
        debug!(owner, turns = turns.len(), "Adding memories");

        let response = self
            .client
            .post(self.memories_url())
            .header("Authorization", self.auth())
            .json(&AddBody {
                messages: turns
                    .iter()
                    .map(|t| ApiTurn {
                        role: t.role.as_str(),
                        content: &t.content,
                    })
                    .collect(),
                user_id: owner,
            })
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn get_all(&self, owner: &str) -> Result<Vec<MemoryRecord>, StoreError> {
        debug!(owner, "Listing memories");

        let response = self
            .client
            .get(self.memories_url())
            .header("Authorization", self.auth())
            .query(&[("user_id", owner)])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Self::read_records(Self::check(response).await?).await
    }

    async fn delete_all(&self, owner: &str) -> Result<(), StoreError> {
        debug!(owner, "Deleting all memories");

        let response = self
            .client
            .delete(self.memories_url())
            .header("Authorization", self.auth())
            .query(&[("user_id", owner)])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}

// --- API wire types ---

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    user_id: &'a str,
    limit: usize,
}

#[derive(Serialize)]
struct AddBody<'a> {
    messages: Vec<ApiTurn<'a>>,
    user_id: &'a str,
}

#[derive(Serialize)]
struct ApiTurn<'a> {
    role: &'a str,
    content: &'a str,
}

/// Mem0 answers with either a bare array or `{"results": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiRecords {
    Bare(Vec<ApiRecord>),
    Wrapped { results: Vec<ApiRecord> },
}

impl ApiRecords {
    fn into_records(self) -> Vec<MemoryRecord> {
        let raw = match self {
            ApiRecords::Bare(records) | ApiRecords::Wrapped { results: records } => records,
        };
        raw.into_iter().filter_map(ApiRecord::into_record).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ApiRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    memory: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    score: Option<f32>,
}

impl ApiRecord {
    /// Records without text carry nothing worth surfacing.
    fn into_record(self) -> Option<MemoryRecord> {
        let text = self.memory.filter(|m| !m.is_empty())?;
        Some(MemoryRecord {
            id: self.id,
            text,
            owner: self.user_id.unwrap_or_default(),
            created_at: self
                .created_at
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc)),
            score: self.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::message::Role;

    #[test]
    fn parse_bare_array() {
        let data = serde_json::json!([
            {"id": "m1", "memory": "Likes green tea", "user_id": "user_ada", "created_at": "2024-05-01T12:00:00Z", "score": 0.91},
            {"id": "m2", "memory": "Works on compilers", "user_id": "user_ada"}
        ]);
        let parsed: ApiRecords = serde_json::from_value(data).unwrap();
        let records = parsed.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "Likes green tea");
        assert_eq!(records[0].owner, "user_ada");
        assert_eq!(records[0].score, Some(0.91));
        assert!(records[0].created_at.is_some());
        assert!(records[1].created_at.is_none());
    }

    #[test]
    fn parse_wrapped_results() {
        let data = serde_json::json!({
            "results": [{"id": "m1", "memory": "Prefers short answers", "user_id": "user_bob"}]
        });
        let parsed: ApiRecords = serde_json::from_value(data).unwrap();
        let records = parsed.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner, "user_bob");
    }

    #[test]
    fn records_without_text_dropped() {
        let data = serde_json::json!([
            {"id": "m1", "memory": "", "user_id": "user_ada"},
            {"id": "m2", "user_id": "user_ada"},
            {"id": "m3", "memory": "kept"}
        ]);
        let records = serde_json::from_value::<ApiRecords>(data).unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "m3");
        assert_eq!(records[0].owner, "");
    }

    #[test]
    fn add_body_shape() {
        let turns = [
            Turn::new(Role::User, "What is due Friday?"),
            Turn::new(Role::Assistant, "The quarterly report."),
        ];
        let body = AddBody {
            messages: turns
                .iter()
                .map(|t| ApiTurn {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
            user_id: "user_ada",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["user_id"], "user_ada");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "The quarterly report.");
    }

    #[test]
    fn store_urls() {
        let store = Mem0Store::new("m0-key", "https://api.mem0.ai/").unwrap();
        assert_eq!(store.memories_url(), "https://api.mem0.ai/v1/memories/");
        assert_eq!(store.auth(), "Token m0-key");
        assert_eq!(store.name(), "mem0");
    }
}
