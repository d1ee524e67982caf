//! Error types for the notion-recall domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error type; callers catch them at the call
//! site and treat the operation as having produced no result.

use thiserror::Error;

/// The top-level error type for all notion-recall operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Memory store errors ---
    #[error("Memory store error: {0}")]
    Store(#[from] StoreError),

    // --- Workspace content errors ---
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    // --- User input errors ---
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Memory API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Memory store rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum WorkspaceError {
    #[error("Workspace API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Workspace token rejected: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Invalid selection format: '{0}' is not a page number")]
    InvalidNumber(String),

    #[error("Please enter a valid name")]
    EmptyName,
}
