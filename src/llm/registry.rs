//! Model registry

use super::groq::{GroqService, DEFAULT_BASE_URL};
use super::models::{all_models, ModelDef, ModelSelector};
use super::{LlmService, LoggingService};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider credentials and sampling defaults
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Registry of available LLM services
pub struct ModelRegistry {
    services: HashMap<&'static str, Arc<dyn LlmService>>,
}

impl ModelRegistry {
    /// Create a registry with one logging-wrapped Groq service per allow-listed model
    #[must_use]
    pub fn new(config: &LlmConfig, client: &Client) -> Self {
        if config.groq_api_key.is_none() {
            tracing::warn!("GROQ_API_KEY not set; chat requests will fail at the provider call");
        }

        let services = all_models()
            .iter()
            .map(|def| {
                let groq = GroqService::new(
                    client.clone(),
                    config.groq_api_key.clone(),
                    def,
                    &config.groq_base_url,
                );
                let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(groq)));
                (def.id, service)
            })
            .collect();

        Self { services }
    }

    /// Build a registry from pre-made services, keyed by their model id
    #[must_use]
    pub fn with_services(services: impl IntoIterator<Item = (ModelSelector, Arc<dyn LlmService>)>) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|(selector, service)| (selector.id(), service))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, selector: ModelSelector) -> Option<Arc<dyn LlmService>> {
        self.services.get(selector.id()).cloned()
    }

    /// Allow-listed models that have a service, in display order
    #[must_use]
    pub fn available_model_info(&self) -> Vec<&'static ModelDef> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .collect()
    }

    #[must_use]
    pub fn default_model_id(&self) -> &'static str {
        ModelSelector::default_model().id()
    }
}
