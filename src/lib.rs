//! NeuroPilot - conversational agent over HTTP
//!
//! A single-step agent pipeline (system prompt injection, then one model
//! call) behind a small axum API, with an optional web-search tool loop.

pub mod api;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod pipeline;
pub mod state_machine;
pub mod system_prompt;
pub mod tools;
