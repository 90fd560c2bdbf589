//! Startup configuration
//!
//! Read once from the process environment (after an optional `.env`), then
//! passed down explicitly. Nothing writes to the environment.

use crate::llm::LlmConfig;
use crate::pipeline::GenerationSettings;
use crate::tools::SearchConfig;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    /// Pipeline cache capacity, 0 disables
    pub pipeline_cache: usize,
    pub enable_tools: bool,
    pub max_tool_rounds: u32,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; empty values count as unset
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a set variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let llm_defaults = LlmConfig::default();
        let search_defaults = SearchConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: get("NEUROPILOT_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse(&get, "NEUROPILOT_PORT", 8000)?,
            },
            llm: LlmConfig {
                groq_api_key: get("GROQ_API_KEY"),
                groq_base_url: get("GROQ_BASE_URL").unwrap_or(llm_defaults.groq_base_url),
                temperature: parse(&get, "NEUROPILOT_TEMPERATURE", llm_defaults.temperature)?,
                max_tokens: parse(&get, "NEUROPILOT_MAX_TOKENS", llm_defaults.max_tokens)?,
            },
            search: SearchConfig {
                tavily_api_key: get("TAVILY_API_KEY"),
                tavily_base_url: get("TAVILY_BASE_URL").unwrap_or(search_defaults.tavily_base_url),
                max_results: parse(&get, "NEUROPILOT_SEARCH_MAX_RESULTS", search_defaults.max_results)?,
            },
            pipeline_cache: parse(&get, "NEUROPILOT_PIPELINE_CACHE", 32)?,
            enable_tools: parse_bool(&get, "NEUROPILOT_ENABLE_TOOLS", false)?,
            max_tool_rounds: parse(&get, "NEUROPILOT_MAX_TOOL_ROUNDS", 3)?,
            http_timeout: Duration::from_secs(parse(&get, "NEUROPILOT_HTTP_TIMEOUT_SECS", 300)?),
        })
    }

    #[must_use]
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        }
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool(get: &impl Fn(&str) -> Option<String>, var: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = get(var) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}
