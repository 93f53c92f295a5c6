//! Configuration for the report pipeline.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. API key for the generative backend.
//! - `EXA_API_KEY` - Required. API key for the Exa search backend.
//! - `PLANNER_MODEL` - Optional. Model used to plan search queries.
//! - `SYNTHESIS_MODEL` - Optional. Model used to synthesize the report.
//! - `QUERY_COUNT` - Optional. Number of planned searches. Defaults to `3`.
//! - `MAX_SEARCH_RESULTS` - Optional. Per-query result cap. Defaults to `10`.
//! - `SEARCH_MAX_RETRIES` - Optional. Retry budget per query. Defaults to `2`.
//! - `SEARCH_TIMEOUT_SECS` - Optional. Per-search deadline. Defaults to `30`.
//! - `SYNTHESIS_TIMEOUT_SECS` - Optional. Completion deadline. Defaults to `120`.
//! - `SEARCH_START_DATE` - Optional. Only results published on or after this
//!   date (`YYYY-MM-DD`).
//! - `SEARCH_TYPE` - Optional. `keyword` or `neural`. Defaults to `keyword`.
//!
//! The pipeline takes the [`Config`] object at construction; nothing reads
//! ambient process state after that.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use crate::search::{RetryPolicy, SearchKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Search client configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Per-query result cap
    pub max_results: usize,

    /// Deadline for a single search call
    pub timeout: Duration,

    /// Only accept results published on or after this date
    pub published_after: Option<NaiveDate>,

    /// Search mode passed through to the backend
    pub kind: SearchKind,

    /// Retry policy for transient backend failures
    pub retry: RetryPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout: Duration::from_secs(30),
            published_after: None,
            kind: SearchKind::Keyword,
            retry: RetryPolicy::default(),
        }
    }
}

/// Generative backend configuration.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Model used to plan search queries
    pub planner_model: String,

    /// Model used to synthesize the report
    pub synthesis_model: String,

    /// Deadline for a single completion call
    pub timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            planner_model: "openai/gpt-4o-mini".to_string(),
            synthesis_model: "openai/gpt-4o".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key for the generative backend
    pub openrouter_api_key: String,

    /// Exa API key for the search backend
    pub exa_api_key: String,

    /// Number of search queries the planner must produce
    pub query_count: usize,

    /// Search client configuration
    pub search: SearchConfig,

    /// Generative backend configuration
    pub synthesis: SynthesisConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` or
    /// `EXA_API_KEY` is not set, and `ConfigError::InvalidValue` for
    /// unparseable numeric, date, or search-type values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let exa_api_key = std::env::var("EXA_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("EXA_API_KEY".to_string()))?;

        let query_count = std::env::var("QUERY_COUNT")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidValue("QUERY_COUNT".to_string(), format!("{}", e)))?;
        if query_count == 0 {
            return Err(ConfigError::InvalidValue(
                "QUERY_COUNT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let max_results = std::env::var("MAX_SEARCH_RESULTS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidValue("MAX_SEARCH_RESULTS".to_string(), format!("{}", e))
            })?;

        let max_retries = std::env::var("SEARCH_MAX_RETRIES")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidValue("SEARCH_MAX_RETRIES".to_string(), format!("{}", e))
            })?;

        let search_timeout = std::env::var("SEARCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("SEARCH_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        let synthesis_timeout = std::env::var("SYNTHESIS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("SYNTHESIS_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        let published_after = std::env::var("SEARCH_START_DATE")
            .ok()
            .map(|v| {
                NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| {
                    ConfigError::InvalidValue("SEARCH_START_DATE".to_string(), format!("{}", e))
                })
            })
            .transpose()?;

        let kind = std::env::var("SEARCH_TYPE")
            .ok()
            .map(|v| {
                v.parse::<SearchKind>()
                    .map_err(|e| ConfigError::InvalidValue("SEARCH_TYPE".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        let search = SearchConfig {
            max_results,
            timeout: search_timeout,
            published_after,
            kind,
            retry: RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            },
        };

        let synthesis = SynthesisConfig {
            planner_model: std::env::var("PLANNER_MODEL")
                .unwrap_or_else(|_| SynthesisConfig::default().planner_model),
            synthesis_model: std::env::var("SYNTHESIS_MODEL")
                .unwrap_or_else(|_| SynthesisConfig::default().synthesis_model),
            timeout: synthesis_timeout,
        };

        Ok(Self {
            openrouter_api_key,
            exa_api_key,
            query_count,
            search,
            synthesis,
        })
    }

    /// Create a config with explicit keys and default tuning (useful for
    /// testing and embedding).
    pub fn new(openrouter_api_key: String, exa_api_key: String) -> Self {
        Self {
            openrouter_api_key,
            exa_api_key,
            query_count: 3,
            search: SearchConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}
