//! Model invoker: one provider call per `InvokeModel` effect

use crate::conversation::{ConversationState, Message, Role, ToolCall};
use crate::llm::{
    ContentBlock, LlmError, LlmMessage, LlmRequest, LlmResponse, LlmService, MessageRole,
    ToolDefinition,
};
use std::sync::Arc;

/// Sampling settings fixed per pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

#[derive(Clone)]
pub struct ModelInvoker {
    service: Arc<dyn LlmService>,
    settings: GenerationSettings,
    tools: Vec<ToolDefinition>,
}

impl ModelInvoker {
    #[must_use]
    pub fn new(service: Arc<dyn LlmService>, settings: GenerationSettings) -> Self {
        Self {
            service,
            settings,
            tools: vec![],
        }
    }

    /// Advertise tools to the model on every call
    #[must_use]
    pub fn with_tool_definitions(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    /// Send the whole conversation and return the reply as an assistant message
    ///
    /// # Errors
    ///
    /// Propagates the provider's `LlmError` unchanged.
    pub async fn invoke(&self, state: &ConversationState) -> Result<Message, LlmError> {
        let request = LlmRequest {
            messages: state.messages().iter().map(to_llm_message).collect(),
            tools: self.tools.clone(),
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        };

        let response = self.service.complete(&request).await?;
        Ok(reply_message(&response))
    }
}

fn to_llm_message(msg: &Message) -> LlmMessage {
    match msg.role {
        Role::User => LlmMessage::user_text(msg.content.clone()),
        Role::Assistant => {
            let mut content = Vec::new();
            if !msg.content.is_empty() || msg.tool_calls.is_empty() {
                content.push(ContentBlock::text(msg.content.clone()));
            }
            content.extend(
                msg.tool_calls
                    .iter()
                    .map(|call| ContentBlock::tool_use(&call.id, &call.name, call.arguments.clone())),
            );
            LlmMessage {
                role: MessageRole::Assistant,
                content,
            }
        }
        Role::Tool => LlmMessage {
            role: MessageRole::User,
            content: vec![ContentBlock::tool_result(
                msg.tool_call_id.clone().unwrap_or_default(),
                msg.content.clone(),
                false,
            )],
        },
    }
}

fn reply_message(response: &LlmResponse) -> Message {
    let calls = response
        .tool_uses()
        .into_iter()
        .map(|(id, name, input)| ToolCall::new(id, name, input.clone()))
        .collect();
    Message::assistant(response.text()).with_tool_calls(calls)
}
