//! Tavily web search

use super::{SearchConfig, SearchResult, Tool, ToolError, ToolOutput, ToolSpec};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_TOOL_NAME: &str = "tavily_search_results_json";

const DESCRIPTION: &str = "A search engine optimized for comprehensive, accurate, and trusted results. \
Useful for when you need to answer questions about current events. \
Input should be a search query.";

pub struct WebSearchTool {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    spec: ToolSpec,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl WebSearchTool {
    #[must_use]
    pub fn new(client: Client, config: &SearchConfig) -> Self {
        Self {
            client,
            api_key: config.tavily_api_key.clone().filter(|k| !k.is_empty()),
            endpoint: format!("{}/search", config.tavily_base_url.trim_end_matches('/')),
            spec: ToolSpec {
                name: DEFAULT_TOOL_NAME.to_string(),
                max_results: config.max_results,
            },
        }
    }

    /// Query the provider, returning at most `max_results` hits
    ///
    /// # Errors
    ///
    /// `ToolError::Upstream` when no API key is configured, the request fails,
    /// or the provider answers with a non-2xx status or an unreadable body.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::Upstream("TAVILY_API_KEY is not configured".to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TavilyRequest {
                api_key,
                query,
                max_results: self.spec.max_results,
                search_depth: "advanced",
            })
            .send()
            .await
            .map_err(|e| ToolError::Upstream(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Upstream(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ToolError::Upstream(format!("HTTP {}: {body}", status.as_u16())));
        }

        let parsed: TavilyResponse = serde_json::from_str(&body)
            .map_err(|e| ToolError::Upstream(format!("Failed to parse response: {e}")))?;

        Ok(parsed
            .results
            .into_iter()
            .take(usize::try_from(self.spec.max_results).unwrap_or(usize::MAX))
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect())
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> String {
        DESCRIPTION.to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "search query to look up"
                }
            },
            "required": ["query"]
        })
    }

    fn spec(&self) -> ToolSpec {
        self.spec.clone()
    }

    async fn run(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let input: SearchInput =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;

        if input.query.trim().is_empty() {
            return Err(ToolError::InvalidInput("query must not be empty".to_string()));
        }

        tracing::debug!(query = %input.query, "Web search");
        self.search(&input.query).await.map(ToolOutput::from_results)
    }
}
