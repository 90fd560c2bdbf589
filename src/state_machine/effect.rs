//! Effects produced by state transitions

use crate::conversation::{Message, ToolCall};

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Prefix the first user message with the system prompt
    InjectSystemPrompt,

    /// Call the model with the full message sequence
    InvokeModel,

    /// Append a message to the conversation
    AppendMessage(Message),

    /// Run a tool call through the registry
    ExecuteTool(ToolCall),
}
