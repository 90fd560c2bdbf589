//! Events that drive state transitions

use crate::conversation::Message;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Begin a run
    Start,

    /// The model produced a reply
    ModelReplied { reply: Message },

    /// A tool call finished
    ToolCompleted { call_id: String, output: String },
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::ModelReplied { .. } => "model_replied",
            Event::ToolCompleted { .. } => "tool_completed",
        }
    }
}
