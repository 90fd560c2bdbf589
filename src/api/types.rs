//! API request and response types
//!
//! Shared with the terminal client, so everything derives both directions.

use crate::llm::ModelDef;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<String>,
    pub model_name: String,
    pub system_prompt: String,
}

/// One message in a successful reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

/// Outcome of `POST /chat`; exactly one shape per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Success { messages: Vec<ReplyMessage> },
    Failure { error: String },
}

impl ChatReply {
    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        ChatReply::Success {
            messages: vec![ReplyMessage {
                kind: "ai".to_string(),
                content: content.into(),
            }],
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        ChatReply::Failure {
            error: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ChatReply::Success { .. })
    }
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Model info for the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub description: String,
    pub context_window: usize,
}

impl From<&ModelDef> for ModelInfo {
    fn from(def: &ModelDef) -> Self {
        Self {
            id: def.id.to_string(),
            description: def.description.to_string(),
            context_window: def.context_window,
        }
    }
}

/// Response for model list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}
