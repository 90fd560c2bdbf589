//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::conversation::{Message, ToolCall};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn arb_tool_call() -> impl Strategy<Value = ToolCall> {
    ("[a-z]{8}", "[a-z ]{1,20}")
        .prop_map(|(id, query)| ToolCall::new(id, "tavily_search_results_json", json!({ "query": query })))
}

fn arb_reply() -> impl Strategy<Value = Message> {
    ("[a-zA-Z0-9 ]{0,50}", proptest::collection::vec(arb_tool_call(), 0..4))
        .prop_map(|(text, calls)| Message::assistant(text).with_tool_calls(calls))
}

fn arb_context() -> impl Strategy<Value = PipelineContext> {
    prop_oneof![
        Just(PipelineContext::single_step()),
        (0u32..5).prop_map(|max| PipelineContext::with_tools(Arc::new(StructuredToolCalls), max)),
    ]
}

fn arb_state() -> impl Strategy<Value = PipelineState> {
    prop_oneof![
        Just(PipelineState::Entry),
        (0u32..5).prop_map(|round| PipelineState::Agent { round }),
        (0u32..5, arb_tool_call(), proptest::collection::vec(arb_tool_call(), 0..3)).prop_map(
            |(round, current, remaining)| PipelineState::ToolCall {
                round,
                current,
                remaining,
            }
        ),
        Just(PipelineState::Terminal),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        arb_reply().prop_map(|reply| Event::ModelReplied { reply }),
        ("[a-z]{8}", "[a-z ]{0,20}").prop_map(|(call_id, output)| Event::ToolCompleted { call_id, output }),
    ]
}

/// Drive a run to completion, answering every tool call immediately
fn run_to_end(context: &PipelineContext, replies: &[Message]) -> (PipelineState, usize, usize) {
    let mut state = PipelineState::Entry;
    let mut replies = replies.iter().cycle();
    let mut model_calls = 0;
    let mut appended = 0;
    let mut pending = vec![Event::Start];

    while let Some(event) = pending.pop() {
        let result = transition(&state, context, event).unwrap();
        for effect in result.effects {
            match effect {
                Effect::InvokeModel => {
                    model_calls += 1;
                    pending.push(Event::ModelReplied {
                        reply: replies.next().cloned().unwrap_or_else(|| Message::assistant("")),
                    });
                }
                Effect::ExecuteTool(call) => pending.push(Event::ToolCompleted {
                    call_id: call.id,
                    output: "[]".to_string(),
                }),
                Effect::AppendMessage(_) => appended += 1,
                Effect::InjectSystemPrompt => {}
            }
        }
        state = result.new_state;
    }
    (state, model_calls, appended)
}

proptest! {
    #[test]
    fn prop_transition_is_deterministic(
        state in arb_state(),
        context in arb_context(),
        event in arb_event(),
    ) {
        let a = transition(&state, &context, event.clone());
        let b = transition(&state, &context, event);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "same input gave different outcomes"),
        }
    }

    #[test]
    fn prop_terminal_is_absorbing(context in arb_context(), event in arb_event()) {
        prop_assert!(transition(&PipelineState::Terminal, &context, event).is_err());
    }

    #[test]
    fn prop_single_step_calls_model_once(replies in proptest::collection::vec(arb_reply(), 1..4)) {
        let (state, model_calls, appended) = run_to_end(&PipelineContext::single_step(), &replies);
        prop_assert!(state.is_terminal());
        prop_assert_eq!(model_calls, 1);
        prop_assert_eq!(appended, 1);
    }

    #[test]
    fn prop_tool_rounds_are_bounded(
        max in 0u32..4,
        replies in proptest::collection::vec(arb_reply(), 1..4),
    ) {
        let context = PipelineContext::with_tools(Arc::new(StructuredToolCalls), max);
        let (state, model_calls, _) = run_to_end(&context, &replies);
        prop_assert!(state.is_terminal());
        prop_assert!(model_calls <= max as usize + 1);
    }

    #[test]
    fn prop_inject_only_at_entry(
        state in arb_state(),
        context in arb_context(),
        event in arb_event(),
    ) {
        if let Ok(result) = transition(&state, &context, event) {
            let injects = result.effects.iter().any(|e| matches!(e, Effect::InjectSystemPrompt));
            prop_assert_eq!(injects, state == PipelineState::Entry);
        }
    }
}
