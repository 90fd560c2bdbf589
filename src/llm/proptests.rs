//! Property-based tests for the Groq translation layer
//!
//! - Malformed responses are rejected
//! - Tool calls survive normalization with their arguments intact
//! - Message translation never produces empty output

use super::groq::{
    normalize_response, translate_message, GroqChoice, GroqFunctionCall, GroqResponse,
    GroqResponseMessage, GroqToolCall, GroqUsage,
};
use super::types::{ContentBlock, LlmMessage, MessageRole};
use proptest::prelude::*;

fn arb_text_block() -> impl Strategy<Value = ContentBlock> {
    "[a-zA-Z0-9 _.!?,]{1,100}".prop_map(|text| ContentBlock::Text { text })
}

fn arb_tool_use_block() -> impl Strategy<Value = ContentBlock> {
    ("[a-z0-9_]{5,20}", "[a-z_]{3,20}", arb_json_value())
        .prop_map(|(id, name, input)| ContentBlock::ToolUse { id, name, input })
}

fn arb_tool_result_block() -> impl Strategy<Value = ContentBlock> {
    ("[a-z0-9_]{5,20}", "[a-zA-Z0-9 _.!?,]{0,100}", any::<bool>()).prop_map(
        |(tool_use_id, content, is_error)| ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        },
    )
}

fn arb_json_value() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        (-1000i64..1000).prop_map(|n| serde_json::Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,50}".prop_map(serde_json::Value::String),
        proptest::collection::hash_map("[a-z_]{1,10}", "[a-zA-Z0-9 ]{0,30}", 0..5).prop_map(|m| {
            serde_json::Value::Object(
                m.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect(),
            )
        }),
    ]
}

fn arb_user_message() -> impl Strategy<Value = LlmMessage> {
    proptest::collection::vec(
        prop_oneof![3 => arb_text_block(), 2 => arb_tool_result_block()],
        0..6,
    )
    .prop_map(|content| LlmMessage {
        role: MessageRole::User,
        content,
    })
}

fn arb_assistant_message() -> impl Strategy<Value = LlmMessage> {
    proptest::collection::vec(
        prop_oneof![3 => arb_text_block(), 3 => arb_tool_use_block()],
        0..6,
    )
    .prop_map(|content| LlmMessage {
        role: MessageRole::Assistant,
        content,
    })
}

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    prop_oneof![arb_user_message(), arb_assistant_message()]
}

fn make_response(
    content: Option<String>,
    tool_calls: Option<Vec<GroqToolCall>>,
    finish_reason: Option<String>,
) -> GroqResponse {
    GroqResponse {
        choices: vec![GroqChoice {
            message: GroqResponseMessage {
                content,
                tool_calls,
            },
            finish_reason,
        }],
        usage: Some(GroqUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
        }),
    }
}

fn make_tool_call(id: &str, name: &str, arguments: &str) -> GroqToolCall {
    GroqToolCall {
        id: id.to_string(),
        r#type: "function".to_string(),
        function: GroqFunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

proptest! {
    #[test]
    fn prop_normalize_rejects_empty(
        finish_reason in proptest::option::of("[a-z_]{3,10}")
    ) {
        let result = normalize_response(make_response(None, None, finish_reason));
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_normalize_keeps_text(text in "[a-zA-Z0-9 ]{0,100}") {
        let resp = normalize_response(make_response(Some(text.clone()), None, Some("stop".to_string())))
            .unwrap();
        prop_assert_eq!(resp.text(), text);
        prop_assert!(resp.end_turn);
        prop_assert_eq!(resp.usage.input_tokens, 10);
    }

    #[test]
    fn prop_normalize_preserves_named_tools(
        calls in proptest::collection::vec(("[a-z0-9]{5,15}", "[a-z_]{3,15}", arb_json_value()), 1..5),
    ) {
        let expected: Vec<_> = calls.iter().map(|(_, _, v)| v.clone()).collect();
        let tool_calls = calls
            .iter()
            .map(|(id, name, args)| make_tool_call(id, name, &serde_json::to_string(args).unwrap()))
            .collect();
        let resp = normalize_response(make_response(None, Some(tool_calls), Some("tool_calls".to_string())))
            .unwrap();

        let inputs: Vec<_> = resp.tool_uses().into_iter().map(|(_, _, input)| input.clone()).collect();
        prop_assert_eq!(inputs, expected);
        prop_assert!(!resp.end_turn);
    }

    #[test]
    fn prop_normalize_rejects_empty_name_tools(id in "[a-z0-9]{5,15}") {
        let tc = make_tool_call(&id, "", "{}");
        let result = normalize_response(make_response(None, Some(vec![tc]), None));
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_normalize_rejects_invalid_json_args(
        id in "[a-z0-9]{5,15}",
        name in "[a-z_]{3,15}",
    ) {
        for invalid in ["{invalid", "not json at all", "{key: unquoted}", "[,]"] {
            let tc = make_tool_call(&id, &name, invalid);
            let result = normalize_response(make_response(Some("ok".to_string()), Some(vec![tc]), None));
            prop_assert!(result.is_err(), "accepted invalid args: {}", invalid);
        }
    }

    #[test]
    fn prop_translate_never_empty_output(msg in arb_message()) {
        prop_assert!(!translate_message(&msg).is_empty());
    }

    #[test]
    fn prop_translate_messages_have_content_or_tool_id(msg in arb_message()) {
        for m in translate_message(&msg) {
            prop_assert!(
                m.content.is_some() || m.tool_calls.is_some() || m.tool_call_id.is_some(),
                "message has neither content, tool_calls, nor tool_call_id: role={}",
                m.role,
            );
        }
    }

    #[test]
    fn prop_translate_one_tool_message_per_result(msg in arb_user_message()) {
        let results = msg
            .content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolResult { .. }))
            .count();
        let tool_messages = translate_message(&msg)
            .iter()
            .filter(|m| m.role == "tool")
            .count();
        prop_assert_eq!(tool_messages, results);
    }
}
