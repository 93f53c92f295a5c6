//! Pipeline wiring and the linear run sequence.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::PipelineError;
use crate::evidence;
use crate::llm::{LlmClient, OpenRouterClient};
use crate::report::ReportRequest;
use crate::search::{ExaClient, SearchBackend, SearchClient};
use crate::writer;

use super::planner::QueryPlanner;
use super::synthesizer::ReportSynthesizer;

/// The report pipeline.
///
/// Stateless across runs; each [`Pipeline::run`] is an independent
/// plan → search → aggregate → synthesize → write sequence.
pub struct Pipeline {
    planner: QueryPlanner,
    search: SearchClient,
    synthesizer: ReportSynthesizer,
}

impl Pipeline {
    /// Wire the production backends (OpenRouter and Exa) from the config.
    pub fn new(config: Config) -> Self {
        let llm: Arc<dyn LlmClient> =
            Arc::new(OpenRouterClient::new(config.openrouter_api_key.clone()));
        let backend: Arc<dyn SearchBackend> =
            Arc::new(ExaClient::new(config.exa_api_key.clone()));
        Self::with_backends(config, llm, backend)
    }

    /// Wire custom backends (tests, alternative providers).
    pub fn with_backends(
        config: Config,
        llm: Arc<dyn LlmClient>,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        let planner = QueryPlanner::new(
            Arc::clone(&llm),
            config.synthesis.planner_model.clone(),
            config.query_count,
            config.synthesis.timeout,
        );
        let search = SearchClient::new(backend, config.search.clone());
        let synthesizer = ReportSynthesizer::new(
            llm,
            config.synthesis.synthesis_model.clone(),
            config.synthesis.timeout,
        );

        Self {
            planner,
            search,
            synthesizer,
        }
    }

    /// Run the full pipeline and return the path of the written report.
    ///
    /// Searches run concurrently and fail fast: the first failed search
    /// aborts the outstanding ones. Join order is the planned query order,
    /// so aggregation does not depend on completion order.
    pub async fn run(&self, request: &ReportRequest) -> Result<PathBuf, PipelineError> {
        info!("planning search queries for topic {:?}", request.topic);
        let queries = self.planner.plan(&request.topic).await?;
        debug!("planned queries: {:?}", queries);

        info!("running {} searches", queries.len());
        let searches = queries.iter().map(|query| self.search.search(query));
        let per_query = futures::future::try_join_all(searches).await?;

        let evidence = evidence::aggregate(per_query);
        info!("aggregated {} unique sources", evidence.len());

        info!("synthesizing report");
        let report = self.synthesizer.synthesize(request, &evidence).await?;

        info!("writing report to {}", request.output_path.display());
        writer::write(&report, &request.output_path).await?;

        Ok(request.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::error::Stage;
    use crate::evidence::SearchResult;
    use crate::llm::ChatMessage;
    use crate::search::SearchKind;

    const PLANNER_MODEL: &str = "planner-stub";

    /// Dispatches on the model id: planner calls get canned queries,
    /// synthesis calls get a canned report.
    struct StubLlm {
        planner_reply: String,
        synthesis_reply: String,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn complete(
            &self,
            model: &str,
            _messages: &[ChatMessage],
        ) -> anyhow::Result<String> {
            if model == PLANNER_MODEL {
                Ok(self.planner_reply.clone())
            } else {
                Ok(self.synthesis_reply.clone())
            }
        }
    }

    /// Returns canned per-query result lists.
    struct StubSearch {
        by_query: HashMap<String, Vec<SearchResult>>,
    }

    #[async_trait]
    impl SearchBackend for StubSearch {
        async fn search(
            &self,
            query: &str,
            _published_after: Option<NaiveDate>,
            _kind: SearchKind,
            _max_results: usize,
        ) -> anyhow::Result<Vec<SearchResult>> {
            Ok(self.by_query.get(query).cloned().unwrap_or_default())
        }
    }

    fn result(url: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: format!("Source {}", url),
            snippet: "snippet".to_string(),
            published_at: None,
            source_query: String::new(),
        }
    }

    fn test_config() -> Config {
        let mut config = Config::new("or-key".to_string(), "exa-key".to_string());
        config.synthesis.planner_model = PLANNER_MODEL.to_string();
        config.synthesis.synthesis_model = "synth-stub".to_string();
        config
    }

    fn scenario_report() -> String {
        "\
# Quantum Computing Updates

## Executive Summary

Summary [1].

## Introduction

Intro.

## Key Findings

Findings [2] and [3].

## Implications

Impact.

## Key Takeaways

- Takeaway one
- Takeaway two
- Takeaway three

## References

- [Source a](https://a.com/) - finding
- [Source c](https://c.com/) - context
- [Source d](https://d.com/) - outlook
"
        .to_string()
    }

    fn scenario_pipeline(output: &std::path::Path) -> (Pipeline, ReportRequest) {
        let llm = Arc::new(StubLlm {
            planner_reply: "q1\nq2\nq3".to_string(),
            synthesis_reply: scenario_report(),
        });

        // Query 1: two results. Query 2: none. Query 3: three results,
        // one URL shared with query 1 under a tracking variant.
        let mut by_query = HashMap::new();
        by_query.insert(
            "q1".to_string(),
            vec![result("https://a.com/"), result("https://b.com/")],
        );
        by_query.insert("q2".to_string(), Vec::new());
        by_query.insert(
            "q3".to_string(),
            vec![
                result("https://b.com/?utm_source=feed"),
                result("https://c.com/"),
                result("https://d.com/"),
            ],
        );

        let pipeline = Pipeline::with_backends(
            test_config(),
            llm,
            Arc::new(StubSearch { by_query }),
        );
        let request = ReportRequest::new("quantum computing updates", output);
        (pipeline, request)
    }

    #[tokio::test]
    async fn end_to_end_scenario_writes_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("reports/quantum.md");
        let (pipeline, request) = scenario_pipeline(&output);

        let path = pipeline.run(&request).await.unwrap();
        assert_eq!(path, output);

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("# Quantum Computing Updates"));
        assert!(written.contains("## References"));
        assert!(written.contains("## Introduction"));
        assert!(written.contains("## Key Findings"));
        assert!(written.contains("## Implications"));
    }

    #[tokio::test]
    async fn all_empty_searches_fail_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.md");

        let llm = Arc::new(StubLlm {
            planner_reply: "q1\nq2\nq3".to_string(),
            synthesis_reply: scenario_report(),
        });
        let pipeline = Pipeline::with_backends(
            test_config(),
            llm,
            Arc::new(StubSearch {
                by_query: HashMap::new(),
            }),
        );
        let request = ReportRequest::new("quantum computing updates", &output);

        let err = pipeline.run(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientEvidence));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn unwritable_path_fails_without_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let output = blocker.join("report.md");

        let (pipeline, request) = scenario_pipeline(&output);
        let err = pipeline.run(&request).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Writing);
        assert!(matches!(err, PipelineError::Write { .. }));
        assert!(!output.exists());
    }
}
