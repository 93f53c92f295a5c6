//! Query planning: topic in, a fixed number of distinct search queries out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PipelineError, Stage};
use crate::llm::{ChatMessage, LlmClient};

use super::prompt::build_planner_prompt;

/// Facet templates used to pad the plan when the model returns fewer
/// distinct queries than required.
const QUERY_FACETS: &[&str] = &[
    "latest developments in {}",
    "how {} works",
    "impact of {}",
    "challenges and limitations of {}",
    "expert analysis of {}",
];

/// Plans search queries with a generative step behind a hard count
/// contract: the output always has exactly `count` distinct, non-empty
/// queries.
pub struct QueryPlanner {
    llm: Arc<dyn LlmClient>,
    model: String,
    count: usize,
    timeout: Duration,
}

impl QueryPlanner {
    pub fn new(llm: Arc<dyn LlmClient>, model: String, count: usize, timeout: Duration) -> Self {
        Self {
            llm,
            model,
            count,
            timeout,
        }
    }

    /// Plan exactly `count` queries for the topic.
    pub async fn plan(&self, topic: &str) -> Result<Vec<String>, PipelineError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PipelineError::InvalidTopic(
                "topic is empty or whitespace-only".to_string(),
            ));
        }

        let messages = [
            ChatMessage::system("You are a research assistant planning web searches."),
            ChatMessage::user(build_planner_prompt(topic, self.count)),
        ];

        let completion =
            tokio::time::timeout(self.timeout, self.llm.complete(&self.model, &messages)).await;
        let raw = match completion {
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: Stage::Planning,
                    timeout: self.timeout,
                });
            }
            Ok(Err(e)) => {
                return Err(PipelineError::Backend {
                    stage: Stage::Planning,
                    message: e.to_string(),
                });
            }
            Ok(Ok(raw)) => raw,
        };

        Ok(self.finalize(topic, parse_query_lines(&raw)))
    }

    /// Enforce the count contract: dedup case-insensitively, truncate
    /// excess, pad any shortfall from the facet templates.
    fn finalize(&self, topic: &str, proposed: Vec<String>) -> Vec<String> {
        let mut queries: Vec<String> = Vec::with_capacity(self.count);
        let mut seen = HashSet::new();

        for query in proposed {
            if queries.len() == self.count {
                break;
            }
            if seen.insert(query.to_lowercase()) {
                queries.push(query);
            }
        }

        if queries.len() < self.count {
            tracing::warn!(
                "planner proposed {} of {} queries; padding from facet templates",
                queries.len(),
                self.count
            );
        }

        let mut filler = 0usize;
        while queries.len() < self.count {
            let candidate = match QUERY_FACETS.get(filler) {
                Some(template) => template.replace("{}", topic),
                None => format!("{} overview part {}", topic, filler - QUERY_FACETS.len() + 2),
            };
            filler += 1;
            if seen.insert(candidate.to_lowercase()) {
                queries.push(candidate);
            }
        }

        queries
    }
}

/// Strip list markers, numbering, and surrounding quotes from the model's
/// one-query-per-line reply.
fn parse_query_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_query_line)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_query_line(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix(['-', '*', '•'])
        .map(str::trim_start)
        .unwrap_or(line);

    // Numbered prefixes like "1." or "2)" followed by a space.
    if let Some((head, rest)) = line.split_once(['.', ')']) {
        if !head.is_empty()
            && head.chars().all(|c| c.is_ascii_digit())
            && rest.starts_with(' ')
        {
            return rest.trim_start().trim_matches('"');
        }
    }

    line.trim_matches('"')
}
