//! Model allow-list
//!
//! The server validates against this list and the terminal client renders it,
//! so both always agree on the selectable models.

use std::fmt;
use thiserror::Error;

/// Identifiers accepted by `/chat`, in display order
pub const MODEL_NAMES: [&str; 2] = ["llama3-70b-8192", "mixtral-8x7b-32768"];

/// Model definition with metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelDef {
    /// Identifier used both on the wire and by the provider
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
}

static MODELS: [ModelDef; 2] = [
    ModelDef {
        id: MODEL_NAMES[0],
        description: "Llama 3 70B (Groq)",
        context_window: 8_192,
    },
    ModelDef {
        id: MODEL_NAMES[1],
        description: "Mixtral 8x7B (Groq)",
        context_window: 32_768,
    },
];

/// Get all allow-listed model definitions
#[must_use]
pub fn all_models() -> &'static [ModelDef] {
    &MODELS
}

/// Rejected model identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid model name")]
pub struct ValidationError {
    pub model_name: String,
}

/// A model identifier known to be on the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelSelector(&'static ModelDef);

impl ModelSelector {
    /// Accept `name` only if it matches an allow-listed identifier exactly
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for any other name, including case or
    /// whitespace variants of an allow-listed one.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        all_models()
            .iter()
            .find(|def| def.id == name)
            .map(ModelSelector)
            .ok_or_else(|| ValidationError {
                model_name: name.to_string(),
            })
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        self.0.id
    }

    /// First allow-listed model
    #[must_use]
    pub fn default_model() -> Self {
        ModelSelector(&all_models()[0])
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
