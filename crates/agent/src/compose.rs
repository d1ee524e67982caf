//! Context composer: a bounded prompt from content, memories, and the
//! current message.
//!
//! Composition is pure string work and cannot fail.

use recall_core::memory::is_snapshot;
use recall_core::message::Message;

/// Most prior memories admitted into one prompt.
pub const MAX_MEMORIES: usize = 3;

/// Appended to content cut at the character budget.
pub const TRUNCATION_MARKER: &str = "...";

const PREAMBLE: &str = "You are a helpful AI assistant with access to the user's Notion workspace content. Use the following information to provide relevant and personalized responses.";

const CONTENT_HEADING: &str =
    "Notion Knowledge Base (use this to answer questions about the user's Notion content):";

const MEMORY_HEADING: &str = "Previous conversation context:";

const INSTRUCTIONS: &str = "Instructions:
- Answer questions using information from the Notion content when relevant
- Reference specific pages, databases, or entries when applicable
- If asked about something not in the Notion content, use your general knowledge
- Be conversational and helpful
- Remember previous conversations for context

Current conversation:";

/// The prompt for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub system_instruction: String,
    pub user_message: String,
    /// Memories that made it into the instruction
    pub memories_used: usize,
    /// Whether the content was cut at the budget
    pub truncated: bool,
}

impl PromptContext {
    /// The two turns handed to the provider: system, then user.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_instruction),
            Message::user(&self.user_message),
        ]
    }
}

/// Build the prompt for `user_message`.
///
/// Snapshot memories are dropped, then the first [`MAX_MEMORIES`] of the
/// rest are kept in the order given; ranking is the store's job. Content
/// longer than `char_budget` characters is cut to exactly that many and
/// marked with [`TRUNCATION_MARKER`].
pub fn compose<S: AsRef<str>>(
    content: &str,
    memories: &[S],
    user_message: &str,
    char_budget: usize,
) -> PromptContext {
    let selected: Vec<&str> = memories
        .iter()
        .map(AsRef::as_ref)
        .filter(|m| !is_snapshot(m))
        .take(MAX_MEMORIES)
        .collect();

    let (preview, truncated) = truncate(content, char_budget);

    let mut instruction = format!("{PREAMBLE}\n\n");
    if !content.is_empty() {
        instruction.push_str(&format!("{CONTENT_HEADING}\n{preview}\n\n"));
    }
    if !selected.is_empty() {
        instruction.push_str(&format!("{MEMORY_HEADING}\n{}\n\n", selected.join("\n")));
    }
    instruction.push_str(INSTRUCTIONS);

    PromptContext {
        system_instruction: instruction,
        user_message: user_message.to_string(),
        memories_used: selected.len(),
        truncated,
    }
}

fn truncate(text: &str, char_budget: usize) -> (String, bool) {
    match text.char_indices().nth(char_budget) {
        Some((cut, _)) => (format!("{}{TRUNCATION_MARKER}", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}
