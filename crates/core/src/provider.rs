//! Provider trait: the abstraction over the language-model completion API.
//!
//! A Provider takes a system instruction plus the user's message and returns
//! the model's reply. Sampling parameters are fixed policy, not caller input.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling temperature used for every completion.
pub const COMPLETION_TEMPERATURE: f32 = 0.7;

/// Maximum tokens generated per reply.
pub const COMPLETION_MAX_TOKENS: u32 = 1024;

/// Model identifiers the assistant may be pointed at.
pub const SUPPORTED_MODELS: [&str; 3] = ["llama3-8b-8192", "llama3-70b-8192", "mixtral-8x7b-32768"];

/// The model used when none is selected.
pub const DEFAULT_MODEL: &str = SUPPORTED_MODELS[0];

/// Whether `model` is one of [`SUPPORTED_MODELS`].
pub fn is_supported_model(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model)
}

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "llama3-8b-8192")
    pub model: String,

    /// The conversation messages (system instruction, then the user turn)
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl ProviderRequest {
    /// Build a request with the fixed sampling policy.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: COMPLETION_TEMPERATURE,
            max_tokens: COMPLETION_MAX_TOKENS,
        }
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "groq").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_fixed_sampling_policy() {
        let req = ProviderRequest::new("llama3-8b-8192", vec![Message::user("hi")]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 1024);
    }

    #[test]
    fn three_models_supported() {
        assert_eq!(SUPPORTED_MODELS.len(), 3);
        assert!(is_supported_model("mixtral-8x7b-32768"));
        assert!(!is_supported_model("gpt-4o"));
        assert_eq!(DEFAULT_MODEL, "llama3-8b-8192");
    }
}
