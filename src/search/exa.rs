//! Exa search API backend.
//!
//! `POST {base}/search` with an `x-api-key` header. Results carry url,
//! title, a text excerpt, and a publication date; the excerpt becomes the
//! result snippet.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{SearchBackend, SearchKind};
use crate::evidence::SearchResult;

const EXA_BASE_URL: &str = "https://api.exa.ai";

/// Characters of page text requested per result.
const SNIPPET_MAX_CHARS: u32 = 500;

/// Client for the Exa search API.
pub struct ExaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_published_date: Option<String>,
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaContents {
    text: ExaTextConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextConfig {
    max_characters: u32,
}

#[derive(Debug, Deserialize)]
struct ExaSearchResponse {
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
}

impl ExaClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, EXA_BASE_URL.to_string())
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl SearchBackend for ExaClient {
    async fn search(
        &self,
        query: &str,
        published_after: Option<NaiveDate>,
        kind: SearchKind,
        max_results: usize,
    ) -> anyhow::Result<Vec<SearchResult>> {
        let request = ExaSearchRequest {
            query,
            num_results: max_results,
            search_type: kind.as_str(),
            start_published_date: published_after.map(|date| format!("{}T00:00:00.000Z", date)),
            contents: ExaContents {
                text: ExaTextConfig {
                    max_characters: SNIPPET_MAX_CHARS,
                },
            },
        };

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("search request failed with {}", status);
        }

        let parsed: ExaSearchResponse = response.json().await?;
        Ok(parsed
            .results
            .into_iter()
            .map(|result| result.into_search_result(query))
            .collect())
    }
}

impl ExaResult {
    fn into_search_result(self, query: &str) -> SearchResult {
        let snippet = self
            .snippet
            .or(self.text)
            .map(|text| compact_whitespace(&text))
            .unwrap_or_default();

        SearchResult {
            published_at: self.published_date.as_deref().and_then(parse_published_date),
            url: self.url,
            title: self.title.unwrap_or_else(|| "Untitled".to_string()),
            snippet,
            source_query: query.to_string(),
        }
    }
}

/// Parse Exa's published date, which may be a bare date or a full
/// ISO-8601 timestamp.
fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}

fn compact_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
