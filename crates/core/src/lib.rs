//! # notion-recall core
//!
//! Domain types, collaborator traits, and error definitions shared by every
//! crate in the workspace. Nothing here performs I/O; the HTTP-backed
//! implementations live in their own crates and depend inward on this one.
//!
//! ## Collaborators
//!
//! - [`Provider`]: language-model completion
//! - [`MemoryStore`]: owner-scoped conversational memory
//! - [`WorkspaceProvider`]: pages and tables from the user's workspace

pub mod error;
pub mod identity;
pub mod memory;
pub mod message;
pub mod provider;
pub mod workspace;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SelectionError, StoreError, WorkspaceError};
pub use identity::OwnerKey;
pub use memory::{MemoryRecord, MemoryStore, SNAPSHOT_PREFIX, Turn};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use workspace::{
    BlockKind, Column, ContentBlock, Page, PageSummary, PropertyValue, Record, Table,
    TableSummary, WorkspaceProvider,
};
