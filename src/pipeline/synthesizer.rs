//! Report synthesis: a persona-steered completion parsed into a
//! structured, validated [`Report`].
//!
//! The generative step owns the prose; everything around it is
//! deterministic. Parsing resolves reference lines against the evidence
//! set, and [`Report::validate`] enforces the structural contract before
//! the report leaves this module.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{PipelineError, Stage};
use crate::evidence::EvidenceSet;
use crate::llm::{ChatMessage, LlmClient};
use crate::report::{Reference, Report, ReportRequest, ReportSection};

use super::prompt::{build_synthesis_prompt, build_synthesis_system_prompt};

/// Synthesizes reports from an evidence set.
pub struct ReportSynthesizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl ReportSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: String, timeout: Duration) -> Self {
        Self {
            llm,
            model,
            timeout,
        }
    }

    /// Produce a validated report for the request.
    pub async fn synthesize(
        &self,
        request: &ReportRequest,
        evidence: &EvidenceSet,
    ) -> Result<Report, PipelineError> {
        if evidence.is_empty() {
            return Err(PipelineError::InsufficientEvidence);
        }

        let today = chrono::Utc::now().date_naive();
        let messages = [
            ChatMessage::system(build_synthesis_system_prompt(request)),
            ChatMessage::user(build_synthesis_prompt(request, evidence, today)),
        ];

        let completion =
            tokio::time::timeout(self.timeout, self.llm.complete(&self.model, &messages)).await;
        let raw = match completion {
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: Stage::Synthesizing,
                    timeout: self.timeout,
                });
            }
            Ok(Err(e)) => {
                return Err(PipelineError::Backend {
                    stage: Stage::Synthesizing,
                    message: e.to_string(),
                });
            }
            Ok(Ok(raw)) => raw,
        };

        let report = parse_report(&raw, evidence, &request.byline, today)?;
        report
            .validate(evidence)
            .map_err(PipelineError::MalformedReport)?;
        Ok(report)
    }
}

/// Parse the model's markdown into a [`Report`].
///
/// The first H1 becomes the title; H2 headings delimit sections. The
/// Executive Summary, Key Takeaways, and References sections are pulled
/// out of the section list and into their dedicated fields.
fn parse_report(
    raw: &str,
    evidence: &EvidenceSet,
    byline: &str,
    today: NaiveDate,
) -> Result<Report, PipelineError> {
    let mut title: Option<String> = None;
    let mut current: Option<(String, String)> = None;
    let mut raw_sections: Vec<(String, String)> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim() == "---" {
            continue;
        }
        // Guard against deeper headings: "### x" must stay body text.
        if let Some(heading) = trimmed.strip_prefix("## ") {
            if !heading.starts_with('#') {
                if let Some(section) = current.take() {
                    raw_sections.push(section);
                }
                current = Some((heading.trim().to_string(), String::new()));
                continue;
            }
        }
        if let Some(heading) = trimmed.strip_prefix("# ") {
            if title.is_none() && !heading.starts_with('#') {
                title = Some(heading.trim().to_string());
                continue;
            }
        }
        if let Some((_, body)) = current.as_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }
    if let Some(section) = current.take() {
        raw_sections.push(section);
    }

    let title = title
        .ok_or_else(|| PipelineError::MalformedReport("missing top-level title".to_string()))?;

    let mut executive_summary = String::new();
    let mut sections = Vec::new();
    let mut takeaways = Vec::new();
    let mut references = Vec::new();

    for (heading, body) in raw_sections {
        match heading.to_lowercase().as_str() {
            "executive summary" => executive_summary = body.trim().to_string(),
            "key takeaways" | "takeaways" => takeaways = parse_bullets(&body),
            "references" => references = parse_references(&body, evidence),
            _ => sections.push(ReportSection {
                heading,
                body: body.trim().to_string(),
            }),
        }
    }

    Ok(Report {
        title,
        executive_summary,
        sections,
        takeaways,
        references,
        byline: byline.to_string(),
        generated_on: today,
    })
}

fn parse_bullets(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix(['-', '*', '•'])
                .map(|rest| rest.trim().to_string())
        })
        .filter(|bullet| !bullet.is_empty())
        .collect()
}

/// Parse `- [Title](url) - note` reference lines, resolving each URL
/// against the evidence set. Lines that cannot be parsed, do not resolve,
/// or carry no note are dropped with a warning.
fn parse_references(body: &str, evidence: &EvidenceSet) -> Vec<Reference> {
    let mut references = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(captures) = reference_line_re().captures(line) else {
            tracing::warn!("skipping unparseable reference line: {}", line);
            continue;
        };
        let url = &captures["url"];
        let note = captures["note"].trim();
        match evidence.get_by_url(url) {
            Some(result) if !note.is_empty() => references.push(Reference {
                result: result.clone(),
                note: note.to_string(),
            }),
            Some(_) => tracing::warn!("reference {} has no note; dropping", url),
            None => tracing::warn!("reference {} does not match any gathered source; dropping", url),
        }
    }
    references
}

fn reference_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[-*•]\s*\[(?P<title>[^\]]+)\]\((?P<url>[^)\s]+)\)\s*(?:[-–—:]\s*)?(?P<note>.*)$")
            .expect("static pattern")
    })
}
