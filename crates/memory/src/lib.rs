//! Memory store implementations for notion-recall.

pub mod in_memory;
pub mod mem0;

pub use in_memory::InMemoryStore;
pub use mem0::Mem0Store;

use recall_config::MemoryConfig;
use recall_core::error::StoreError;
use recall_core::memory::MemoryStore;
use std::sync::Arc;

/// Build the cloud memory store described by `config`, authenticated
/// with `api_key`.
pub fn build_store(config: &MemoryConfig, api_key: &str) -> Result<Arc<dyn MemoryStore>, StoreError> {
    Ok(Arc::new(Mem0Store::new(api_key, &config.base_url)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_yields_cloud_store() {
        let store = build_store(&MemoryConfig::default(), "m0-test").unwrap();
        assert_eq!(store.name(), "mem0");
    }
}
