pub mod chat;
pub mod databases;
pub mod export;
pub mod pages;

use recall_config::{AppConfig, ConfigError, WORKSPACE_TOKEN_VAR};
use recall_core::workspace::WorkspaceProvider;
use std::sync::Arc;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| {
        if let ConfigError::ValidationError(_) = &e {
            eprintln!("  Check {}", AppConfig::config_dir().join("config.toml").display());
        }
        format!("Failed to load config: {e}").into()
    })
}

/// Setup hints for a missing credential.
pub(crate) fn explain_missing(name: &str) {
    eprintln!();
    eprintln!("  ERROR: {name} is not set!");
    eprintln!();
    eprintln!("  Add it to the environment or to a .env file:");
    eprintln!("    {name}=your_key_here");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}

/// The workspace client, or `None` with a notice when no token is set.
pub(crate) fn connect_workspace(
    config: &AppConfig,
) -> Result<Option<Arc<dyn WorkspaceProvider>>, Box<dyn std::error::Error>> {
    let workspace = recall_workspace::connect(&config.workspace)?;
    if workspace.is_none() {
        println!("  {WORKSPACE_TOKEN_VAR} not set: workspace features are disabled.");
    }
    Ok(workspace)
}

/// The workspace client, required by the listing and export commands.
pub(crate) fn require_workspace(
    config: &AppConfig,
) -> Result<Arc<dyn WorkspaceProvider>, Box<dyn std::error::Error>> {
    match recall_workspace::connect(&config.workspace)? {
        Some(workspace) => Ok(workspace),
        None => {
            explain_missing(WORKSPACE_TOKEN_VAR);
            Err(format!("{WORKSPACE_TOKEN_VAR} is required for this command").into())
        }
    }
}
