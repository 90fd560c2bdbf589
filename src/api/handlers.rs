//! HTTP request handlers

use super::types::{ChatReply, ChatRequest, ModelInfo, ModelsResponse, StatusResponse};
use super::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

/// Create the API router
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/chat", post(chat))
        .route("/models", get(list_models))
        .with_state(state)
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        message: "NeuroPilot agent API is running".to_string(),
    })
}

/// Outcome travels in the body; the status is always 200
async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatReply> {
    Json(state.gateway.handle(request).await)
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = state
        .llm_registry
        .available_model_info()
        .into_iter()
        .map(ModelInfo::from)
        .collect();

    Json(ModelsResponse {
        models,
        default: state.llm_registry.default_model_id().to_string(),
    })
}
