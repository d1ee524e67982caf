//! Configuration loading, validation, and management for notion-recall.
//!
//! Loads configuration from `~/.notion-recall/config.toml` with environment
//! variable overrides. Credentials normally come from the environment:
//!
//! - `GROQ_API_KEY`: completion provider key (required)
//! - `MEM0_API_KEY`: memory store key (required)
//! - `NOTION_TOKEN`: workspace token (optional; workspace features are
//!   disabled without it)

use recall_core::provider::{DEFAULT_MODEL, SUPPORTED_MODELS, is_supported_model};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const COMPLETION_KEY_VAR: &str = "GROQ_API_KEY";
pub const MEMORY_KEY_VAR: &str = "MEM0_API_KEY";
pub const WORKSPACE_TOKEN_VAR: &str = "NOTION_TOKEN";
pub const MODEL_VAR: &str = "RECALL_MODEL";

/// The root configuration structure.
///
/// Maps directly to `~/.notion-recall/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion provider settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Memory store settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Workspace content provider settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Prompt assembly settings
    #[serde(default)]
    pub context: ContextConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_completion_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_completion_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_url(),
            model: default_model(),
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_memory_url")]
    pub base_url: String,

    /// How many memories to request per search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_memory_url() -> String {
    "https://api.mem0.ai".into()
}
fn default_search_limit() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_memory_url(),
            search_limit: default_search_limit(),
        }
    }
}

impl std::fmt::Debug for MemoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("search_limit", &self.search_limit)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_workspace_url")]
    pub base_url: String,

    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_workspace_url() -> String {
    "https://api.notion.com/v1".into()
}
fn default_notion_version() -> String {
    "2022-06-28".into()
}
fn default_page_size() -> u32 {
    100
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_workspace_url(),
            notion_version: default_notion_version(),
            page_size: default_page_size(),
        }
    }
}

impl std::fmt::Debug for WorkspaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConfig")
            .field("token", &redact(&self.token))
            .field("base_url", &self.base_url)
            .field("notion_version", &self.notion_version)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum characters of workspace content admitted into one prompt
    #[serde(default = "default_char_budget")]
    pub char_budget: usize,
}

fn default_char_budget() -> usize {
    3000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            char_budget: default_char_budget(),
        }
    }
}

/// Keys a chat session is started with. `memory_key` is `None` when
/// memories stay in process.
#[derive(Clone)]
pub struct Credentials {
    pub completion_key: String,
    pub memory_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path, then apply environment
    /// overrides from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_with(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill credentials and the model from `lookup`.
    ///
    /// Credentials set in the file win; `RECALL_MODEL` always overrides the model.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.completion.api_key.is_none() {
            self.completion.api_key = lookup(COMPLETION_KEY_VAR);
        }
        if self.memory.api_key.is_none() {
            self.memory.api_key = lookup(MEMORY_KEY_VAR);
        }
        if self.workspace.token.is_none() {
            self.workspace.token = lookup(WORKSPACE_TOKEN_VAR);
        }
        if let Some(model) = lookup(MODEL_VAR) {
            self.completion.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".notion-recall")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_supported_model(&self.completion.model) {
            return Err(ConfigError::ValidationError(format!(
                "model '{}' is not one of: {}",
                self.completion.model,
                SUPPORTED_MODELS.join(", ")
            )));
        }

        if self.context.char_budget == 0 {
            return Err(ConfigError::ValidationError(
                "context.char_budget must be > 0".into(),
            ));
        }

        if self.memory.search_limit == 0 {
            return Err(ConfigError::ValidationError(
                "memory.search_limit must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// The completion and memory keys, or the first one missing.
    pub fn require_credentials(&self) -> Result<Credentials, ConfigError> {
        let completion_key = self.completion_key()?;
        let memory_key = self
            .memory
            .api_key
            .clone()
            .ok_or(ConfigError::MissingCredential {
                name: MEMORY_KEY_VAR,
            })?;
        Ok(Credentials {
            completion_key,
            memory_key: Some(memory_key),
        })
    }

    /// The completion key alone, for sessions whose memories stay in process.
    pub fn require_offline_credentials(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            completion_key: self.completion_key()?,
            memory_key: None,
        })
    }

    fn completion_key(&self) -> Result<String, ConfigError> {
        self.completion
            .api_key
            .clone()
            .ok_or(ConfigError::MissingCredential {
                name: COMPLETION_KEY_VAR,
            })
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing credential: set the {name} environment variable")]
    MissingCredential { name: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion.model, "llama3-8b-8192");
        assert_eq!(config.context.char_budget, 3000);
        assert_eq!(config.memory.search_limit, 5);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.completion.base_url, config.completion.base_url);
        assert_eq!(parsed.workspace.notion_version, "2022-06-28");
    }

    #[test]
    fn unsupported_model_rejected() {
        let mut config = AppConfig::default();
        config.completion.model = "gpt-4o".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-4o"));
    }

    #[test]
    fn zero_char_budget_rejected() {
        let mut config = AppConfig::default();
        config.context.char_budget = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.memory.base_url, "https://api.mem0.ai");
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[completion]\nmodel = \"llama3-70b-8192\"\n\n[context]\nchar_budget = 1500\n"
        )
        .unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.completion.model, "llama3-70b-8192");
        assert_eq!(config.context.char_budget, 1500);
        assert_eq!(config.memory.search_limit, 5);
    }

    #[test]
    fn malformed_config_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[completion\nmodel = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_supplies_credentials() {
        let mut config = AppConfig::default();
        config.apply_env_with(env(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("MEM0_API_KEY", "m0-test"),
            ("NOTION_TOKEN", "secret_abc"),
            ("RECALL_MODEL", "mixtral-8x7b-32768"),
        ]));
        let creds = config.require_credentials().unwrap();
        assert_eq!(creds.completion_key, "gsk-test");
        assert_eq!(creds.memory_key.as_deref(), Some("m0-test"));
        assert_eq!(config.workspace.token.as_deref(), Some("secret_abc"));
        assert_eq!(config.completion.model, "mixtral-8x7b-32768");
    }

    #[test]
    fn missing_completion_key_is_fatal() {
        let mut config = AppConfig::default();
        config.apply_env_with(env(&[("MEM0_API_KEY", "m0-test")]));
        let err = config.require_credentials().err().unwrap();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { name: "GROQ_API_KEY" }
        ));
    }

    #[test]
    fn missing_memory_key_is_fatal() {
        let mut config = AppConfig::default();
        config.apply_env_with(env(&[("GROQ_API_KEY", "gsk-test")]));
        assert!(matches!(
            config.require_credentials(),
            Err(ConfigError::MissingCredential { name: "MEM0_API_KEY" })
        ));
    }

    #[test]
    fn missing_workspace_token_degrades() {
        let mut config = AppConfig::default();
        config.apply_env_with(env(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("MEM0_API_KEY", "m0-test"),
            ("NOTION_TOKEN", "  "),
        ]));
        assert!(config.require_credentials().is_ok());
        assert!(config.workspace.token.is_none());
    }

    #[test]
    fn offline_credentials_need_only_completion_key() {
        let mut config = AppConfig::default();
        config.apply_env_with(env(&[("GROQ_API_KEY", "gsk-test")]));
        let creds = config.require_offline_credentials().unwrap();
        assert_eq!(creds.completion_key, "gsk-test");
        assert!(creds.memory_key.is_none());

        let empty = AppConfig::default();
        assert!(matches!(
            empty.require_offline_credentials(),
            Err(ConfigError::MissingCredential { name: "GROQ_API_KEY" })
        ));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.completion.api_key = Some("gsk-very-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
