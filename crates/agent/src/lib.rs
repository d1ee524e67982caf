//! The chat side of notion-recall.
//!
//! Each user turn runs the same cycle:
//!
//! 1. **Recall** memories relevant to the message, scoped to the owner
//! 2. **Compose** a bounded prompt from workspace content and those memories
//! 3. **Complete** through the configured provider
//! 4. **Remember** the exchange in the memory store
//!
//! A failed recall or save is logged and the turn goes on.

pub mod compose;
pub mod session;

pub use compose::{MAX_MEMORIES, PromptContext, compose};
pub use session::{ContentReport, Session};
