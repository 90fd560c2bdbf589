//! Request gateway: validate, build the pipeline, run it, shape the reply

use super::types::{ChatReply, ChatRequest};
use crate::conversation::ConversationState;
use crate::llm::{LlmService, ModelRegistry, ModelSelector};
use crate::pipeline::{AgentPipeline, GenerationSettings, ModelInvoker, PipelineCache};
use crate::state_machine::StructuredToolCalls;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

struct ToolWiring {
    registry: ToolRegistry,
    max_tool_rounds: u32,
}

pub struct ChatGateway {
    registry: Arc<ModelRegistry>,
    settings: GenerationSettings,
    cache: PipelineCache,
    tools: Option<ToolWiring>,
}

impl ChatGateway {
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>, settings: GenerationSettings, cache_capacity: usize) -> Self {
        Self {
            registry,
            settings,
            cache: PipelineCache::new(cache_capacity),
            tools: None,
        }
    }

    /// Let the model call tools from `registry`
    #[must_use]
    pub fn with_tools(mut self, registry: ToolRegistry, max_tool_rounds: u32) -> Self {
        self.tools = Some(ToolWiring {
            registry,
            max_tool_rounds,
        });
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Handle one chat request. Never fails; errors become `ChatReply::Failure`.
    pub async fn handle(&self, request: ChatRequest) -> ChatReply {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chat",
            request_id = %request_id,
            model = %request.model_name,
            messages = request.messages.len(),
        );
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: ChatRequest) -> ChatReply {
        let selector = match ModelSelector::parse(&request.model_name) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!(model = %e.model_name, "Rejected model");
                return ChatReply::error(e.to_string());
            }
        };

        let Some(service) = self.registry.get(selector) else {
            tracing::error!(model = selector.id(), "No service for allow-listed model");
            return ChatReply::error(format!(
                "Error processing request: model {selector} is not available"
            ));
        };

        let pipeline = self
            .cache
            .get_or_insert_with(selector.id(), &request.system_prompt, || {
                self.build_pipeline(service, &request.system_prompt)
            });

        let start = std::time::Instant::now();
        match pipeline
            .run(ConversationState::from_user_texts(request.messages))
            .await
        {
            Ok(conversation) => {
                tracing::info!(
                    duration_ms = %start.elapsed().as_millis(),
                    messages = conversation.len(),
                    "Chat completed"
                );
                let content = conversation
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                ChatReply::ai(content)
            }
            Err(e) => {
                tracing::error!(error = %e, "Chat failed");
                ChatReply::error(format!("Error processing request: {e}"))
            }
        }
    }

    fn build_pipeline(&self, service: Arc<dyn LlmService>, system_prompt: &str) -> AgentPipeline {
        let pipeline = AgentPipeline::new(ModelInvoker::new(service, self.settings), system_prompt);
        match &self.tools {
            Some(wiring) => pipeline.with_tools(
                wiring.registry.clone(),
                Arc::new(StructuredToolCalls),
                wiring.max_tool_rounds,
            ),
            None => pipeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ContentBlock, LlmError, LlmResponse, Usage};
    use crate::pipeline::testing::MockLlm;
    use crate::tools::{SearchResult, Tool, ToolError, ToolOutput, ToolSpec};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StubSearch;

    #[async_trait]
    impl Tool for StubSearch {
        fn name(&self) -> &str {
            "tavily_search_results_json"
        }

        fn description(&self) -> String {
            "stub".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        fn spec(&self) -> ToolSpec {
            ToolSpec::default()
        }

        async fn run(&self, _input: Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::from_results(vec![SearchResult {
                title: "Groq".to_string(),
                url: "https://groq.com".to_string(),
                snippet: "fast inference".to_string(),
            }]))
        }
    }

    fn gateway_with(mock: Arc<MockLlm>) -> ChatGateway {
        let registry = ModelRegistry::with_services([
            (ModelSelector::parse("llama3-70b-8192").unwrap(), mock.clone() as Arc<dyn LlmService>),
            (ModelSelector::parse("mixtral-8x7b-32768").unwrap(), mock as Arc<dyn LlmService>),
        ]);
        ChatGateway::new(Arc::new(registry), GenerationSettings::default(), 8)
    }

    fn request(model: &str, messages: &[&str]) -> ChatRequest {
        ChatRequest {
            messages: messages.iter().map(ToString::to_string).collect(),
            model_name: model.to_string(),
            system_prompt: "Be terse.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_valid_request_returns_last_message() {
        let mock = Arc::new(MockLlm::new("llama3-70b-8192"));
        mock.queue_response(LlmResponse::text_only("Hi!"));

        let reply = gateway_with(mock.clone())
            .handle(request("llama3-70b-8192", &["hello"]))
            .await;

        assert_eq!(reply, ChatReply::ai("Hi!"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_model_skips_provider() {
        let mock = Arc::new(MockLlm::new("llama3-70b-8192"));
        let reply = gateway_with(mock.clone())
            .handle(request("gpt-4", &["hello"]))
            .await;

        assert_eq!(reply, ChatReply::error("Invalid model name"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_catch_all() {
        let mock = Arc::new(MockLlm::failing(
            "llama3-70b-8192",
            LlmError::server_error("Server error: upstream down"),
        ));
        let reply = gateway_with(mock)
            .handle(request("mixtral-8x7b-32768", &["hello"]))
            .await;

        assert_eq!(
            reply,
            ChatReply::error("Error processing request: Server error: upstream down")
        );
    }

    #[tokio::test]
    async fn test_unavailable_model() {
        let gateway = ChatGateway::new(
            Arc::new(ModelRegistry::with_services(std::iter::empty())),
            GenerationSettings::default(),
            0,
        );
        let reply = gateway.handle(request("llama3-70b-8192", &["hello"])).await;
        assert!(!reply.is_success());
    }

    #[tokio::test]
    async fn test_pipeline_reused_for_same_prompt() {
        let mock = Arc::new(MockLlm::new("llama3-70b-8192"));
        mock.queue_response(LlmResponse::text_only("one"));
        mock.queue_response(LlmResponse::text_only("two"));
        let gateway = gateway_with(mock);

        gateway.handle(request("llama3-70b-8192", &["a"])).await;
        gateway.handle(request("llama3-70b-8192", &["b"])).await;
        assert_eq!(gateway.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_wiring_runs_search_loop() {
        let mock = Arc::new(MockLlm::new("llama3-70b-8192"));
        mock.queue_response(LlmResponse {
            content: vec![ContentBlock::tool_use(
                "call_1",
                "tavily_search_results_json",
                json!({"query": "groq"}),
            )],
            end_turn: false,
            usage: Usage::default(),
        });
        mock.queue_response(LlmResponse::text_only("Groq runs models fast."));

        let gateway = gateway_with(mock.clone())
            .with_tools(ToolRegistry::with_tools(vec![Arc::new(StubSearch)]), 3);
        let reply = gateway.handle(request("llama3-70b-8192", &["what is groq?"])).await;

        assert_eq!(reply, ChatReply::ai("Groq runs models fast."));
        assert_eq!(mock.call_count(), 2);

        let requests = mock.recorded_requests();
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_round_limit_returns_empty_reply() {
        let mock = Arc::new(MockLlm::new("llama3-70b-8192"));
        mock.queue_response(LlmResponse {
            content: vec![ContentBlock::tool_use(
                "call_1",
                "tavily_search_results_json",
                json!({"query": "groq"}),
            )],
            end_turn: false,
            usage: Usage::default(),
        });

        let gateway = gateway_with(mock.clone())
            .with_tools(ToolRegistry::with_tools(vec![Arc::new(StubSearch)]), 0);
        let reply = gateway.handle(request("llama3-70b-8192", &["what is groq?"])).await;

        assert_eq!(reply, ChatReply::ai(""));
        assert_eq!(mock.call_count(), 1);
    }
}
