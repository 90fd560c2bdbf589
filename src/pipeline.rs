//! Agent pipeline: executes the effects of the pure state machine
//!
//! A run starts at `Entry`, injects the system prompt, calls the model and
//! stops at `Terminal`. With tools wired in, the model may loop through
//! tool calls up to a fixed number of rounds.

mod cache;
mod invoker;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::PipelineCache;
pub use invoker::{GenerationSettings, ModelInvoker};

use crate::conversation::ConversationState;
use crate::llm::LlmError;
use crate::state_machine::{
    transition, Effect, Event, PipelineContext, PipelineState, ToolTrigger, TransitionError,
};
use crate::system_prompt::inject_system_prompt;
use crate::tools::{ToolError, ToolRegistry};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Provider(#[from] LlmError),
    #[error("{0}")]
    Tool(#[from] ToolError),
    #[error("{0}")]
    Transition(#[from] TransitionError),
    #[error("Pipeline stopped in state {0}")]
    Incomplete(&'static str),
}

/// A configured pipeline; immutable and shareable across requests
pub struct AgentPipeline {
    invoker: ModelInvoker,
    system_prompt: String,
    tools: Option<ToolRegistry>,
    context: PipelineContext,
}

impl AgentPipeline {
    #[must_use]
    pub fn new(invoker: ModelInvoker, system_prompt: impl Into<String>) -> Self {
        Self {
            invoker,
            system_prompt: system_prompt.into(),
            tools: None,
            context: PipelineContext::single_step(),
        }
    }

    /// Enable the tool-call branch
    #[must_use]
    pub fn with_tools(
        mut self,
        registry: ToolRegistry,
        trigger: Arc<dyn ToolTrigger>,
        max_tool_rounds: u32,
    ) -> Self {
        self.invoker = self.invoker.with_tool_definitions(registry.definitions());
        self.tools = Some(registry);
        self.context = PipelineContext::with_tools(trigger, max_tool_rounds);
        self
    }

    /// Run to `Terminal` and return the final conversation.
    ///
    /// # Errors
    ///
    /// Provider and tool failures abort the run, as does an event the
    /// transition table rejects.
    pub async fn run(&self, initial: ConversationState) -> Result<ConversationState, PipelineError> {
        let mut conversation = initial;
        let mut state = PipelineState::Entry;
        let mut events = VecDeque::from([Event::Start]);

        while let Some(event) = events.pop_front() {
            let event_name = event.name();
            let result = transition(&state, &self.context, event)?;
            tracing::debug!(
                from = state.name(),
                to = result.new_state.name(),
                event = event_name,
                "Pipeline transition"
            );
            state = result.new_state;

            for effect in result.effects {
                self.execute_effect(effect, &mut conversation, &mut events)
                    .await?;
            }
        }

        if !state.is_terminal() {
            return Err(PipelineError::Incomplete(state.name()));
        }

        let pending = self.unanswered_tool_calls(&conversation);
        if pending > 0 {
            tracing::warn!(
                model = self.invoker.model_id(),
                max_tool_rounds = self.context.max_tool_rounds,
                pending_tool_calls = pending,
                "Tool round limit reached; final reply still requests tools"
            );
        }
        Ok(conversation)
    }

    /// Tool calls left on the final reply once the round limit stopped the loop
    fn unanswered_tool_calls(&self, conversation: &ConversationState) -> usize {
        conversation
            .last()
            .map_or(0, |reply| self.context.requested_tools(reply).len())
    }

    async fn execute_effect(
        &self,
        effect: Effect,
        conversation: &mut ConversationState,
        events: &mut VecDeque<Event>,
    ) -> Result<(), PipelineError> {
        match effect {
            Effect::InjectSystemPrompt => {
                *conversation =
                    inject_system_prompt(std::mem::take(conversation), &self.system_prompt);
            }
            Effect::InvokeModel => {
                let reply = self.invoker.invoke(conversation).await?;
                events.push_back(Event::ModelReplied { reply });
            }
            Effect::AppendMessage(message) => conversation.push(message),
            Effect::ExecuteTool(call) => {
                let registry = self
                    .tools
                    .as_ref()
                    .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
                let output = registry.invoke(&call.name, call.arguments).await?;
                events.push_back(Event::ToolCompleted {
                    call_id: call.id,
                    output: output.output,
                });
            }
        }
        Ok(())
    }
}
