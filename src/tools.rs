//! Tools the agent can call
//!
//! Tools are stateless singletons; credentials arrive through explicit config.

mod web_search;

pub use web_search::{WebSearchTool, DEFAULT_BASE_URL, DEFAULT_TOOL_NAME};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Result from tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Text handed back to the model
    pub output: String,
    pub results: Vec<SearchResult>,
}

impl ToolOutput {
    #[must_use]
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        let output = serde_json::to_string(&results).unwrap_or_else(|_| "[]".to_string());
        Self { output, results }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
    #[error("Search provider error: {0}")]
    Upstream(String),
}

/// Name and result bound of a registered search capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub max_results: u32,
}

impl Default for ToolSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOOL_NAME.to_string(),
            max_results: 3,
        }
    }
}

/// Search credentials and limits
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            tavily_base_url: DEFAULT_BASE_URL.to_string(),
            max_results: ToolSpec::default().max_results,
        }
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    fn spec(&self) -> ToolSpec;

    /// # Errors
    ///
    /// `ToolError::InvalidInput` for input that does not match the schema,
    /// `ToolError::Upstream` when the backing service fails.
    async fn run(&self, input: Value) -> Result<ToolOutput, ToolError>;
}

/// Collection of tools available to the pipeline
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the web search tool
    #[must_use]
    pub fn from_config(config: &SearchConfig, client: &Client) -> Self {
        if config.tavily_api_key.is_none() {
            tracing::warn!("TAVILY_API_KEY not set; web searches will fail");
        }
        Self::with_tools(vec![Arc::new(WebSearchTool::new(client.clone(), config))])
    }

    #[must_use]
    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Run a tool by name
    ///
    /// # Errors
    ///
    /// `ToolError::NotFound` if no tool has that name, otherwise whatever the
    /// tool itself returns.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .lookup(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let start = std::time::Instant::now();
        let result = tool.run(input).await;
        match &result {
            Ok(output) => tracing::info!(
                tool = name,
                duration_ms = %start.elapsed().as_millis(),
                results = output.results.len(),
                "Tool completed"
            ),
            Err(e) => tracing::warn!(tool = name, error = %e, "Tool failed"),
        }
        result
    }

    /// Get all tool definitions for LLM
    #[must_use]
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|t| crate::llm::ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }
}
