//! Web search client: backend trait, retry policy, per-call timeout.
//!
//! Backends perform one outbound request per call and report faults as
//! plain errors; classification into retryable/terminal, backoff, and the
//! timeout deadline all live in [`SearchClient`] so every backend (and
//! every test stub) gets the same policy.

mod exa;

pub use exa::ExaClient;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::SearchConfig;
use crate::error::{PipelineError, Stage};
use crate::evidence::SearchResult;

/// Upper bound on a single retry delay.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Search mode passed through to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    Keyword,
    Neural,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Neural => "neural",
        }
    }
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "neural" => Ok(Self::Neural),
            other => Err(format!("expected 'keyword' or 'neural', got: {}", other)),
        }
    }
}

/// A search backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one query and return up to `max_results` ranked results.
    async fn search(
        &self,
        query: &str,
        published_after: Option<NaiveDate>,
        kind: SearchKind,
        max_results: usize,
    ) -> anyhow::Result<Vec<SearchResult>>;
}

/// Exponential backoff policy for transient backend failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier per consecutive failure (typically 2.0).
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay_secs =
            self.base_delay.as_secs_f64() * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = delay_secs.min(MAX_RETRY_DELAY.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}

/// Retrying wrapper around a search backend.
///
/// Timeouts are terminal (`Timeout`, distinct from unavailability); any
/// other backend error is retried with exponential backoff until the
/// budget runs out, then surfaced as `SearchUnavailable`.
pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        Self { backend, config }
    }

    /// Run one query with the configured deadline and retry budget.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, PipelineError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let call = self.backend.search(
                query,
                self.config.published_after,
                self.config.kind,
                self.config.max_results,
            );

            match tokio::time::timeout(self.config.timeout, call).await {
                Err(_) => {
                    return Err(PipelineError::Timeout {
                        stage: Stage::Searching,
                        timeout: self.config.timeout,
                    });
                }
                Ok(Ok(mut results)) => {
                    results.truncate(self.config.max_results);
                    for result in &mut results {
                        result.source_query = query.to_string();
                    }
                    tracing::debug!("query {:?} returned {} results", query, results.len());
                    return Ok(results);
                }
                Ok(Err(e)) => {
                    if attempt > self.config.retry.max_retries {
                        return Err(PipelineError::SearchUnavailable {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    let delay = self.config.retry.delay_for(attempt);
                    tracing::warn!(
                        "search attempt {} for {:?} failed: {}; retrying in {:?}",
                        attempt,
                        query,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
