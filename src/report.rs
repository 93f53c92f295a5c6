//! Report data model: the generation request, the synthesized report,
//! markdown rendering, and structural validation.
//!
//! Synthesis is generative and non-deterministic, so the contract binds the
//! *structure* of the output: required sections, takeaway count, references
//! that resolve into the evidence set, and citation markers that point at
//! real reference entries. [`Report::validate`] checks exactly that.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::evidence::{EvidenceSet, SearchResult};

/// Default persona steering the synthesis tone.
pub const DEFAULT_PERSONA: &str = "\
You are Professor X-1000, a distinguished AI research scientist with expertise \
in analyzing and synthesizing complex information. Your specialty lies in \
creating compelling, fact-based reports that combine academic rigor with an \
engaging narrative.";

/// Default writing-style instructions passed alongside the persona.
pub const DEFAULT_STYLE_INSTRUCTIONS: &str = "\
Your writing style is:
- Clear and authoritative
- Engaging but professional
- Fact-focused with proper citations
- Accessible to educated non-specialists";

/// Default byline rendered in the report footer.
pub const DEFAULT_BYLINE: &str = "Professor X-1000, Advanced Research Systems Division";

/// Section headings that must be present in every synthesized report.
pub const REQUIRED_SECTIONS: [&str; 3] = ["Introduction", "Key Findings", "Implications"];

/// Minimum number of takeaway bullets a report must carry.
pub const MIN_TAKEAWAYS: usize = 3;

/// One report generation request. Immutable; created once per invocation.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub topic: String,
    pub persona: String,
    pub style_instructions: String,
    pub byline: String,
    pub output_path: PathBuf,
}

impl ReportRequest {
    /// Build a request with the default academic-researcher persona.
    pub fn new(topic: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            topic: topic.into(),
            persona: DEFAULT_PERSONA.to_string(),
            style_instructions: DEFAULT_STYLE_INSTRUCTIONS.to_string(),
            byline: DEFAULT_BYLINE.to_string(),
            output_path: output_path.into(),
        }
    }
}

/// A titled body section of the report.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub heading: String,
    pub body: String,
}

/// A cited source with a note on why it matters.
#[derive(Debug, Clone)]
pub struct Reference {
    pub result: SearchResult,
    pub note: String,
}

/// The synthesized report. Built once; never mutated after synthesis.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub executive_summary: String,
    pub sections: Vec<ReportSection>,
    pub takeaways: Vec<String>,
    pub references: Vec<Reference>,
    pub byline: String,
    pub generated_on: NaiveDate,
}

impl Report {
    /// Render the report as a markdown document: title as H1, sections as
    /// H2, takeaways and references as bullet lists, date-stamped footer.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", self.title));

        out.push_str("## Executive Summary\n\n");
        out.push_str(self.executive_summary.trim());
        out.push_str("\n\n");

        for section in &self.sections {
            out.push_str(&format!("## {}\n\n", section.heading));
            out.push_str(section.body.trim());
            out.push_str("\n\n");
        }

        out.push_str("## Key Takeaways\n\n");
        for takeaway in &self.takeaways {
            out.push_str(&format!("- {}\n", takeaway));
        }
        out.push('\n');

        out.push_str("## References\n\n");
        for reference in &self.references {
            out.push_str(&format!(
                "- [{}]({}) - {}\n",
                reference.result.title, reference.result.url, reference.note
            ));
        }
        out.push('\n');

        out.push_str("---\n");
        out.push_str(&format!("Report generated by {}\n", self.byline));
        out.push_str(&format!("Date: {}\n", self.generated_on));

        out
    }

    /// Structural validation against the evidence set the report was
    /// synthesized from. Returns a description of the first violation.
    pub fn validate(&self, evidence: &EvidenceSet) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is empty".to_string());
        }
        if self.executive_summary.trim().is_empty() {
            return Err("executive summary is missing".to_string());
        }
        for required in REQUIRED_SECTIONS {
            if !self
                .sections
                .iter()
                .any(|s| s.heading.eq_ignore_ascii_case(required))
            {
                return Err(format!("required section missing: {}", required));
            }
        }
        if self.takeaways.len() < MIN_TAKEAWAYS {
            return Err(format!(
                "expected at least {} takeaways, got {}",
                MIN_TAKEAWAYS,
                self.takeaways.len()
            ));
        }
        if self.references.is_empty() {
            return Err("references list is empty".to_string());
        }
        for reference in &self.references {
            if reference.note.trim().is_empty() {
                return Err(format!(
                    "reference {} has an empty note",
                    reference.result.url
                ));
            }
            if !evidence.contains_url(&reference.result.url) {
                return Err(format!(
                    "reference {} is not part of the gathered evidence",
                    reference.result.url
                ));
            }
        }
        self.check_citation_markers()
    }

    /// Every inline `[n]` marker must point at an existing reference entry.
    fn check_citation_markers(&self) -> Result<(), String> {
        let bodies = std::iter::once(self.executive_summary.as_str())
            .chain(self.sections.iter().map(|s| s.body.as_str()))
            .chain(self.takeaways.iter().map(String::as_str));

        for body in bodies {
            for capture in citation_marker_re().captures_iter(body) {
                let number: usize = capture[1].parse().unwrap_or(0);
                if number == 0 || number > self.references.len() {
                    return Err(format!(
                        "citation marker [{}] does not resolve to a reference",
                        &capture[1]
                    ));
                }
            }
        }
        Ok(())
    }
}

fn citation_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("static pattern"))
}
