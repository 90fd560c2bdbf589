//! Pure state transition function

use super::{Effect, Event, PipelineContext, PipelineState};
use crate::conversation::Message;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: PipelineState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
///
/// # Errors
///
/// `TransitionError::InvalidTransition` for an event the current state does
/// not accept.
pub fn transition(
    state: &PipelineState,
    context: &PipelineContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (PipelineState::Entry, Event::Start) => {
            Ok(TransitionResult::new(PipelineState::Agent { round: 0 })
                .with_effect(Effect::InjectSystemPrompt)
                .with_effect(Effect::InvokeModel))
        }

        (PipelineState::Agent { round }, Event::ModelReplied { reply }) => {
            let mut calls = if *round < context.max_tool_rounds {
                context.requested_tools(&reply)
            } else {
                vec![]
            };

            if calls.is_empty() {
                return Ok(TransitionResult::new(PipelineState::Terminal)
                    .with_effect(Effect::AppendMessage(reply)));
            }

            let current = calls.remove(0);
            Ok(TransitionResult::new(PipelineState::ToolCall {
                round: *round,
                current: current.clone(),
                remaining: calls,
            })
            .with_effect(Effect::AppendMessage(reply))
            .with_effect(Effect::ExecuteTool(current)))
        }

        (
            PipelineState::ToolCall {
                round,
                current,
                remaining,
            },
            Event::ToolCompleted { call_id, output },
        ) if call_id == current.id => {
            let result = Message::tool_result(call_id, output);

            match remaining.split_first() {
                Some((next, rest)) => Ok(TransitionResult::new(PipelineState::ToolCall {
                    round: *round,
                    current: next.clone(),
                    remaining: rest.to_vec(),
                })
                .with_effect(Effect::AppendMessage(result))
                .with_effect(Effect::ExecuteTool(next.clone()))),
                None => Ok(TransitionResult::new(PipelineState::Agent { round: round + 1 })
                    .with_effect(Effect::AppendMessage(result))
                    .with_effect(Effect::InvokeModel)),
            }
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} in state {}",
            event.name(),
            state.name()
        ))),
    }
}
