//! System prompt injection
//!
//! The provider receives no separate system message. Instead the operator's
//! prompt is folded into the first user message, once, at pipeline entry.

use crate::conversation::{ConversationState, Role};

/// Prompt the interactive client pre-fills for a new session
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide detailed and accurate responses.";

/// Prepend `system_prompt` to the first message if it was authored by the user.
///
/// Empty states and states opening with a non-user message are returned
/// untouched. Not idempotent: running it twice prepends the prompt twice.
#[must_use]
pub fn inject_system_prompt(mut state: ConversationState, system_prompt: &str) -> ConversationState {
    if let Some(first) = state.first_mut() {
        if first.role == Role::User {
            first.content = format!("{system_prompt}\n\n{}", first.content);
        }
    }
    state
}
