//! Owner identity: the key that scopes every memory-store operation.

use crate::error::SelectionError;
use serde::{Deserialize, Serialize};
use std::fmt;

const OWNER_PREFIX: &str = "user_";

/// Stable per-user key derived from a display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerKey(String);

impl OwnerKey {
    /// Derive the key: `user_` + the trimmed, lowercased name with spaces
    /// replaced by underscores.
    pub fn from_name(name: &str) -> Result<Self, SelectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SelectionError::EmptyName);
        }
        Ok(Self(format!(
            "{OWNER_PREFIX}{}",
            name.to_lowercase().replace(' ', "_")
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human label for prompts: the key without its prefix, each word capitalized.
    pub fn display_name(&self) -> String {
        self.0
            .strip_prefix(OWNER_PREFIX)
            .unwrap_or(&self.0)
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OwnerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_key_from_padded_name() {
        let key = OwnerKey::from_name(" Ada Lovelace ").unwrap();
        assert_eq!(key.as_str(), "user_ada_lovelace");
    }

    #[test]
    fn blank_name_rejected() {
        assert_eq!(OwnerKey::from_name("   "), Err(SelectionError::EmptyName));
    }

    #[test]
    fn display_name_title_cases_words() {
        let key = OwnerKey::from_name("grace hopper").unwrap();
        assert_eq!(key.display_name(), "Grace Hopper");
    }
}
