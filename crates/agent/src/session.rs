//! One user's chat session.

use crate::compose::{PromptContext, compose};
use recall_config::AppConfig;
use recall_core::error::{ProviderError, StoreError};
use recall_core::identity::OwnerKey;
use recall_core::memory::{MemoryRecord, MemoryStore, Turn};
use recall_core::message::Role;
use recall_core::provider::{DEFAULT_MODEL, Provider, ProviderRequest};
use recall_workspace::AggregatedContent;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Memories examined, newest first, when listing.
const RECENT_WINDOW: usize = 10;

/// Memories shown when listing.
pub const SHOWN_MEMORIES: usize = 5;

/// Characters of a memory shown in a listing.
pub const PREVIEW_CHARS: usize = 150;

/// Counters describing the loaded content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentReport {
    pub table_present: bool,
    pub page_count: usize,
    pub char_count: usize,
    pub page_titles: Vec<String>,
}

impl ContentReport {
    pub fn is_empty(&self) -> bool {
        self.char_count == 0
    }
}

/// Chat state for one owner: collaborator handles, settings, and the
/// currently loaded workspace content.
pub struct Session {
    provider: Arc<dyn Provider>,
    memory: Arc<dyn MemoryStore>,
    owner: OwnerKey,
    model: String,
    char_budget: usize,
    search_limit: usize,
    content: AggregatedContent,
}

impl Session {
    pub fn new(provider: Arc<dyn Provider>, memory: Arc<dyn MemoryStore>, owner: OwnerKey) -> Self {
        Self {
            provider,
            memory,
            owner,
            model: DEFAULT_MODEL.to_string(),
            char_budget: 3000,
            search_limit: 5,
            content: AggregatedContent::default(),
        }
    }

    /// A session using the model and limits from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        memory: Arc<dyn MemoryStore>,
        owner: OwnerKey,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, memory, owner)
            .with_model(&config.completion.model)
            .with_char_budget(config.context.char_budget)
            .with_search_limit(config.memory.search_limit)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the most content characters admitted into one prompt.
    pub fn with_char_budget(mut self, budget: usize) -> Self {
        self.char_budget = budget;
        self
    }

    /// Set the most memories requested per recall.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn content(&self) -> &AggregatedContent {
        &self.content
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Replace the loaded content and store a snapshot of it.
    ///
    /// The content stays loaded for prompts even when the snapshot cannot be
    /// stored; the error is returned for display.
    pub async fn load_content(&mut self, content: AggregatedContent) -> Result<(), StoreError> {
        self.content = content;
        self.ingest_snapshot().await
    }

    /// Store the loaded content as a snapshot memory. No-op without content.
    pub async fn ingest_snapshot(&self) -> Result<(), StoreError> {
        if self.content.is_empty() {
            return Ok(());
        }
        self.memory
            .add(&[Turn::snapshot(&self.content.text)], self.owner.as_str())
            .await?;
        info!(
            owner = %self.owner,
            chars = self.content.char_count,
            "Stored content snapshot"
        );
        Ok(())
    }

    /// Memories relevant to `query`, restricted to this owner. A failed
    /// search yields none.
    async fn recall(&self, query: &str) -> Vec<String> {
        match self
            .memory
            .search(query, self.owner.as_str(), self.search_limit)
            .await
        {
            Ok(records) => {
                let texts: Vec<String> = records
                    .into_iter()
                    .filter(|r| r.owner == self.owner.as_str())
                    .map(|r| r.text)
                    .collect();
                debug!(count = texts.len(), "Recalled memories");
                texts
            }
            Err(e) => {
                warn!(error = %e, "Memory recall failed");
                Vec::new()
            }
        }
    }

    /// The prompt that would be sent for `user_message`.
    pub async fn prompt_for(&self, user_message: &str) -> PromptContext {
        let memories = self.recall(user_message).await;
        compose(&self.content.text, &memories, user_message, self.char_budget)
    }

    /// Answer one user message, then remember the exchange.
    pub async fn respond(&self, user_message: &str) -> Result<String, ProviderError> {
        let prompt = self.prompt_for(user_message).await;
        debug!(
            memories = prompt.memories_used,
            truncated = prompt.truncated,
            "Prompt composed"
        );

        let request = ProviderRequest::new(&self.model, prompt.messages());
        let response = self.provider.complete(request).await?;
        let reply = response.message.content;

        let turns = [
            Turn::new(Role::User, user_message),
            Turn::new(Role::Assistant, &reply),
        ];
        if let Err(e) = self.memory.add(&turns, self.owner.as_str()).await {
            warn!(error = %e, "Failed to save conversation to memory");
        }

        Ok(reply)
    }

    /// Up to [`SHOWN_MEMORIES`] conversational memories, newest first.
    /// Snapshots are never listed.
    pub async fn recent_memories(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        let all = self.memory.get_all(self.owner.as_str()).await?;
        Ok(all
            .into_iter()
            .rev()
            .filter(|r| r.owner == self.owner.as_str())
            .take(RECENT_WINDOW)
            .filter(|r| !r.is_snapshot())
            .take(SHOWN_MEMORIES)
            .collect())
    }

    /// Delete every memory of this owner, then store the content snapshot
    /// again so loaded content survives the wipe.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.memory.delete_all(self.owner.as_str()).await?;
        info!(owner = %self.owner, "Memories cleared");
        self.ingest_snapshot().await
    }

    pub fn report(&self) -> ContentReport {
        ContentReport {
            table_present: self.content.table_present,
            page_count: self.content.page_count,
            char_count: self.content.char_count,
            page_titles: self
                .content
                .page_titles()
                .into_iter()
                .map(|t| t.trim().to_string())
                .collect(),
        }
    }
}

/// `text` cut to `max_chars` characters, marked with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recall_core::memory::SNAPSHOT_PREFIX;
    use recall_core::message::Message;
    use recall_core::provider::ProviderResponse;
    use recall_memory::InMemoryStore;
    use recall_workspace::aggregate;
    use std::sync::Mutex;

    /// Replies with a fixed text and keeps every request it saw.
    struct RecordingProvider {
        reply: String,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.into(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_system(&self) -> String {
            let requests = self.requests.lock().unwrap();
            requests.last().unwrap().messages[0].content.clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            Ok(ProviderResponse {
                message: Message::assistant(&self.reply),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            })
        }
    }

    fn owner(name: &str) -> OwnerKey {
        OwnerKey::from_name(name).unwrap()
    }

    fn content_with_page(title: &str) -> AggregatedContent {
        let section = format!("\n{0}\nPAGE: {title}\n{0}\n# {title}\n\nBody\n\n", "=".repeat(80));
        aggregate::<&str, String>(&[], &[section])
    }

    #[tokio::test]
    async fn respond_saves_both_turns() {
        let provider = RecordingProvider::new("The report is due Friday.");
        let store = Arc::new(InMemoryStore::new());
        let session = Session::new(provider.clone(), store.clone(), owner("Ada"));

        let reply = session.respond("When is the report due?").await.unwrap();
        assert_eq!(reply, "The report is due Friday.");

        let saved = store.get_all("user_ada").await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].text, "When is the report due?");
        assert_eq!(saved[1].text, "The report is due Friday.");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].model, DEFAULT_MODEL);
        assert_eq!(requests[0].max_tokens, 1024);
        assert_eq!(requests[0].messages[1].content, "When is the report due?");
    }

    #[tokio::test]
    async fn recalled_memories_reach_the_prompt() {
        let provider = RecordingProvider::new("ok");
        let store = Arc::new(InMemoryStore::new());
        store
            .add(&[Turn::new(Role::User, "My favourite tea is sencha")], "user_ada")
            .await
            .unwrap();
        let session = Session::new(provider.clone(), store, owner("Ada"));

        session.respond("which tea do I like?").await.unwrap();
        assert!(provider.last_system().contains("Previous conversation context:\nMy favourite tea is sencha"));
    }

    #[tokio::test]
    async fn snapshot_is_stored_but_never_recalled() {
        let provider = RecordingProvider::new("ok");
        let store = Arc::new(InMemoryStore::new());
        let mut session = Session::new(provider.clone(), store.clone(), owner("Ada"));

        session.load_content(content_with_page("Roadmap")).await.unwrap();
        let all = store.get_all("user_ada").await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].text.starts_with(SNAPSHOT_PREFIX));

        session.respond("roadmap body").await.unwrap();
        let system = provider.last_system();
        assert!(!system.contains(SNAPSHOT_PREFIX));
        assert!(system.contains("PAGE: Roadmap"));
        assert!(session.recent_memories().await.unwrap().iter().all(|m| !m.is_snapshot()));
    }

    #[tokio::test]
    async fn other_owners_memories_stay_out() {
        let provider = RecordingProvider::new("ok");
        let store = Arc::new(InMemoryStore::new());
        store
            .add(&[Turn::new(Role::User, "Bob's salary negotiation notes")], "user_bob")
            .await
            .unwrap();
        let session = Session::new(provider.clone(), store, owner("Ada"));

        session.respond("salary negotiation").await.unwrap();
        assert!(!provider.last_system().contains("Bob's"));
        assert!(session.recent_memories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_returned_and_nothing_saved() {
        let store = Arc::new(InMemoryStore::new());
        let session = Session::new(Arc::new(FailingProvider), store.clone(), owner("Ada"));

        let err = session.respond("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn recent_memories_newest_first_limited() {
        let store = Arc::new(InMemoryStore::new());
        let turns: Vec<Turn> = (1..=8)
            .map(|i| Turn::new(Role::User, format!("note {i}")))
            .collect();
        store.add(&turns, "user_ada").await.unwrap();
        let session = Session::new(RecordingProvider::new("ok"), store, owner("Ada"));

        let recent = session.recent_memories().await.unwrap();
        let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["note 8", "note 7", "note 6", "note 5", "note 4"]);
    }

    #[tokio::test]
    async fn clear_keeps_only_the_snapshot() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = Session::new(RecordingProvider::new("ok"), store.clone(), owner("Ada"));
        session.load_content(content_with_page("Roadmap")).await.unwrap();
        session.respond("hello there").await.unwrap();
        assert_eq!(store.len().await, 3);

        session.clear().await.unwrap();
        let all = store.get_all("user_ada").await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_snapshot());
    }

    #[tokio::test]
    async fn clear_without_content_leaves_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let session = Session::new(RecordingProvider::new("ok"), store.clone(), owner("Ada"));
        session.respond("hello there").await.unwrap();
        session.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn char_budget_applies() {
        let provider = RecordingProvider::new("ok");
        let store = Arc::new(InMemoryStore::new());
        let mut session =
            Session::new(provider.clone(), store, owner("Ada")).with_char_budget(100);
        let big = aggregate::<&str, String>(&[], &["w".repeat(500)]);
        session.load_content(big).await.unwrap();

        session.respond("hi").await.unwrap();
        assert!(provider.last_system().contains(&format!("{}...", "w".repeat(100 - 95))));
    }

    #[test]
    fn report_recovers_titles() {
        let session = Session {
            provider: RecordingProvider::new("ok"),
            memory: Arc::new(InMemoryStore::new()),
            owner: owner("Ada"),
            model: DEFAULT_MODEL.into(),
            char_budget: 3000,
            search_limit: 5,
            content: content_with_page("Roadmap"),
        };
        let report = session.report();
        assert!(!report.table_present);
        assert_eq!(report.page_count, 1);
        assert_eq!(report.page_titles, vec!["Roadmap"]);
        assert!(!report.is_empty());
    }

    #[test]
    fn previews_cut_at_limit() {
        assert_eq!(preview("short", PREVIEW_CHARS), "short");
        let long = "a".repeat(200);
        assert_eq!(preview(&long, PREVIEW_CHARS), format!("{}...", "a".repeat(150)));
    }
}
