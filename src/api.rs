//! HTTP API

mod gateway;
mod handlers;
mod types;

pub use gateway::ChatGateway;
pub use handlers::create_router;
pub use types::*;

use crate::llm::ModelRegistry;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ChatGateway>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: ChatGateway) -> Self {
        let llm_registry = gateway.registry().clone();
        Self {
            gateway: Arc::new(gateway),
            llm_registry,
        }
    }
}
