//! Completion provider implementations for notion-recall.
//!
//! All providers implement the `recall_core::Provider` trait. Handles are
//! built from explicit configuration; nothing reads credentials from the
//! process environment here.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use recall_config::CompletionConfig;
use recall_core::error::ProviderError;
use recall_core::provider::Provider;
use std::sync::Arc;

/// Build the completion provider described by `config`, authenticated
/// with `api_key`.
pub fn build_provider(
    config: &CompletionConfig,
    api_key: &str,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider = OpenAiCompatProvider::new("groq", &config.base_url, api_key)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_targets_configured_endpoint() {
        let config = CompletionConfig::default();
        let provider = build_provider(&config, "gsk-test").unwrap();
        assert_eq!(provider.name(), "groq");
    }
}
