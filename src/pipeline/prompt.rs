//! Prompt assembly for the planner and synthesizer calls.

use chrono::NaiveDate;

use crate::evidence::EvidenceSet;
use crate::report::ReportRequest;

/// Build the planner prompt: exactly `count` queries, one per line.
pub fn build_planner_prompt(topic: &str, count: usize) -> String {
    format!(
        r#"Propose exactly {count} distinct web search queries that together cover the topic below from different angles (recent developments, underlying mechanisms, broader impact).

Topic: {topic}

Rules:
- One query per line, plain text.
- No numbering, bullets, or commentary.
- Each query must be specific enough to return useful results on its own."#
    )
}

/// Build the synthesizer system prompt from the request's persona and
/// style configuration.
pub fn build_synthesis_system_prompt(request: &ReportRequest) -> String {
    format!("{}\n\n{}", request.persona, request.style_instructions)
}

/// Build the synthesizer user prompt: instructions, the expected-output
/// template, and the numbered evidence block.
pub fn build_synthesis_prompt(
    request: &ReportRequest,
    evidence: &EvidenceSet,
    today: NaiveDate,
) -> String {
    format!(
        r#"Write a research report on the topic below, grounded exclusively in the numbered sources.

Topic: {topic}
Today's date: {today}

Instructions:
- Cross-reference the sources and include only facts they support.
- Cite sources inline with bracketed numbers, e.g. [2], matching the numbering below.
- Follow academic structure but keep the narrative readable and engaging.
- End with actionable takeaways and future implications.

Respond in exactly this markdown structure:

# {{Compelling title that captures the topic's essence}}

## Executive Summary
{{Brief overview of key findings and significance}}

## Introduction
{{Context and importance of the topic}}

## Key Findings
{{Major discoveries or developments, with inline citations}}

## Implications
{{Impact on the field and future directions}}

## Key Takeaways
- {{Takeaway 1}}
- {{Takeaway 2}}
- {{Takeaway 3}}

## References
- [Source title](url) - key finding or why this source matters

Use only URLs that appear in the sources below in the References section.

Sources:
{sources}"#,
        topic = request.topic,
        today = today,
        sources = serialize_evidence(evidence),
    )
}

/// Serialize the evidence set as a numbered context block. The numbering
/// is what inline `[n]` citations refer back to.
fn serialize_evidence(evidence: &EvidenceSet) -> String {
    let mut out = String::new();
    for (index, result) in evidence.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", index + 1, result.title));
        out.push_str(&format!("URL: {}\n", result.url));
        if let Some(date) = result.published_at {
            out.push_str(&format!("Published: {}\n", date));
        }
        if !result.snippet.is_empty() {
            out.push_str(&format!("Excerpt: {}\n", result.snippet));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::SearchResult;

    #[test]
    fn planner_prompt_names_the_count_and_topic() {
        let prompt = build_planner_prompt("fusion energy", 3);
        assert!(prompt.contains("exactly 3"));
        assert!(prompt.contains("Topic: fusion energy"));
    }

    #[test]
    fn synthesis_prompt_numbers_the_evidence() {
        let mut evidence = EvidenceSet::new();
        evidence.insert(SearchResult {
            url: "https://a.com/one".to_string(),
            title: "First".to_string(),
            snippet: "alpha".to_string(),
            published_at: None,
            source_query: "q".to_string(),
        });
        evidence.insert(SearchResult {
            url: "https://b.com/two".to_string(),
            title: "Second".to_string(),
            snippet: String::new(),
            published_at: None,
            source_query: "q".to_string(),
        });

        let request = ReportRequest::new("fusion energy", "out.md");
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let prompt = build_synthesis_prompt(&request, &evidence, today);

        assert!(prompt.contains("[1] First"));
        assert!(prompt.contains("[2] Second"));
        assert!(prompt.contains("Excerpt: alpha"));
        assert!(prompt.contains("## References"));
        assert!(prompt.contains("Today's date: 2026-08-06"));
    }
}
