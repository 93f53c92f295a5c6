//! Search results and the deduplicated evidence set backing a report.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single ranked result returned by the search backend.
///
/// Immutable once fetched. `source_query` records which planned query
/// produced the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub published_at: Option<NaiveDate>,
    pub source_query: String,
}

/// Deduplicated, insertion-ordered collection of search results.
///
/// Uniqueness is by normalized URL; insertion order is first-seen order
/// across the planned queries.
#[derive(Debug, Clone, Default)]
pub struct EvidenceSet {
    entries: Vec<SearchResult>,
    by_url: HashMap<String, usize>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result unless its normalized URL is already present.
    /// Returns true if the result was inserted.
    pub fn insert(&mut self, result: SearchResult) -> bool {
        match self.by_url.entry(normalize_url(&result.url)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push(result);
                true
            }
        }
    }

    /// Look up an entry by URL (tracking-parameter variants resolve to the
    /// same entry).
    pub fn get_by_url(&self, url: &str) -> Option<&SearchResult> {
        self.by_url
            .get(&normalize_url(url))
            .map(|&index| &self.entries[index])
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.by_url.contains_key(&normalize_url(url))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge per-query result lists into one evidence set.
///
/// Lists must be in planned query order; for a URL shared across queries the
/// first-seen result wins.
pub fn aggregate(result_lists: Vec<Vec<SearchResult>>) -> EvidenceSet {
    let mut evidence = EvidenceSet::new();
    for results in result_lists {
        for result in results {
            evidence.insert(result);
        }
    }
    evidence
}

/// Query parameters that identify a click, not a document.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "igshid", "mc_cid", "mc_eid", "ref_src"];

fn is_tracking_param(name: &str) -> bool {
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name)
}

/// Normalize a URL for deduplication: lowercase host, drop the fragment,
/// and strip tracking query parameters. Unparseable input falls back to
/// the trimmed original so it still dedupes against itself.
pub fn normalize_url(raw: &str) -> String {
    let mut parsed = match Url::parse(raw.trim()) {
        Ok(parsed) => parsed,
        Err(_) => return raw.trim().to_string(),
    };

    if let Some(host) = parsed.host_str().map(str::to_ascii_lowercase) {
        let _ = parsed.set_host(Some(&host));
    }
    parsed.set_fragment(None);

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| !is_tracking_param(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, query: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: format!("Title for {}", url),
            snippet: "snippet".to_string(),
            published_at: None,
            source_query: query.to_string(),
        }
    }

    // ── normalize_url ─────────────────────────────────────────────────

    #[test]
    fn normalize_strips_tracking_params_and_fragment() {
        let normalized =
            normalize_url("https://example.com/a?utm_source=x&utm_medium=y&id=7#section");
        assert_eq!(normalized, "https://example.com/a?id=7");
    }

    #[test]
    fn normalize_lowercases_host_only() {
        assert_eq!(
            normalize_url("https://Example.COM/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn normalize_keeps_meaningful_params() {
        assert_eq!(
            normalize_url("https://example.com/search?q=rust&page=2"),
            "https://example.com/search?q=rust&page=2"
        );
    }

    #[test]
    fn normalize_falls_back_on_unparseable_input() {
        assert_eq!(normalize_url("  not a url  "), "not a url");
    }

    // ── EvidenceSet / aggregate ───────────────────────────────────────

    #[test]
    fn tracking_variants_merge_to_one_entry() {
        let lists = vec![
            vec![result("https://example.com/story?utm_source=feed", "q1")],
            vec![result("https://example.com/story?fbclid=abc123", "q2")],
            vec![result("https://EXAMPLE.com/story", "q3")],
        ];
        let evidence = aggregate(lists);
        assert_eq!(evidence.len(), 1);
        // First-seen entry wins.
        assert_eq!(evidence.iter().next().unwrap().source_query, "q1");
    }

    #[test]
    fn aggregate_preserves_first_seen_order() {
        let lists = vec![
            vec![result("https://a.com/", "q1"), result("https://b.com/", "q1")],
            vec![result("https://b.com/", "q2"), result("https://c.com/", "q2")],
        ];
        let evidence = aggregate(lists);
        let urls: Vec<&str> = evidence.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/", "https://b.com/", "https://c.com/"]);
    }

    #[test]
    fn shared_url_across_uneven_queries_dedupes() {
        let lists = vec![
            vec![result("https://a.com/", "q1"), result("https://b.com/", "q1")],
            vec![],
            vec![
                result("https://b.com/?utm_source=feed", "q3"),
                result("https://c.com/", "q3"),
                result("https://d.com/", "q3"),
            ],
        ];
        assert_eq!(aggregate(lists).len(), 4);
    }

    #[test]
    fn aggregate_membership_is_permutation_invariant() {
        let l1 = vec![result("https://a.com/", "q1"), result("https://b.com/", "q1")];
        let l2 = vec![result("https://b.com/", "q2"), result("https://c.com/", "q2")];
        let l3 = vec![result("https://a.com/?utm_source=x", "q3")];

        let forward = aggregate(vec![l1.clone(), l2.clone(), l3.clone()]);
        let backward = aggregate(vec![l3, l2, l1]);

        let members = |set: &EvidenceSet| {
            let mut urls: Vec<String> = set.iter().map(|r| normalize_url(&r.url)).collect();
            urls.sort();
            urls
        };
        assert_eq!(members(&forward), members(&backward));
    }

    #[test]
    fn lookup_resolves_tracking_variants() {
        let mut evidence = EvidenceSet::new();
        evidence.insert(result("https://example.com/story", "q1"));
        assert!(evidence.contains_url("https://example.com/story?utm_campaign=news"));
        assert!(evidence
            .get_by_url("https://example.com/story#top")
            .is_some());
        assert!(!evidence.contains_url("https://example.com/other"));
    }
}
