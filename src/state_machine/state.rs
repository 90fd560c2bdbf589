//! Pipeline state types

use crate::conversation::{Message, ToolCall};
use std::fmt;
use std::sync::Arc;

/// Pipeline state; "agent" is the entry node
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Not started
    Entry,

    /// Waiting on the model
    Agent { round: u32 },

    /// Executing one requested tool call; `remaining` run after it in order
    ToolCall {
        round: u32,
        current: ToolCall,
        remaining: Vec<ToolCall>,
    },

    /// Final reply appended
    Terminal,
}

impl PipelineState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Entry => "entry",
            PipelineState::Agent { .. } => "agent",
            PipelineState::ToolCall { .. } => "tool_call",
            PipelineState::Terminal => "terminal",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Terminal)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decides whether a model reply asks for tools
pub trait ToolTrigger: Send + Sync {
    fn requested_tools(&self, reply: &Message) -> Vec<ToolCall>;
}

/// Takes the provider's structured tool calls at face value
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredToolCalls;

impl ToolTrigger for StructuredToolCalls {
    fn requested_tools(&self, reply: &Message) -> Vec<ToolCall> {
        reply.tool_calls.clone()
    }
}

/// Immutable configuration the transition function reads
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub max_tool_rounds: u32,
    pub tool_trigger: Option<Arc<dyn ToolTrigger>>,
}

impl PipelineContext {
    /// Single-step pipeline: one model call, no tools
    #[must_use]
    pub fn single_step() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tools(trigger: Arc<dyn ToolTrigger>, max_tool_rounds: u32) -> Self {
        Self {
            max_tool_rounds,
            tool_trigger: Some(trigger),
        }
    }

    pub(crate) fn requested_tools(&self, reply: &Message) -> Vec<ToolCall> {
        self.tool_trigger
            .as_ref()
            .map(|t| t.requested_tools(reply))
            .unwrap_or_default()
    }
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("tool_trigger", &self.tool_trigger.is_some())
            .finish()
    }
}
