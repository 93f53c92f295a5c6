//! Pipeline error taxonomy.
//!
//! Every stage failure aborts the remaining pipeline and surfaces as a
//! [`PipelineError`] that names the failing stage and wraps the original
//! cause. Raw backend errors are captured as messages and never leak
//! through unwrapped.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Searching,
    Aggregating,
    Synthesizing,
    Writing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::Searching => write!(f, "searching"),
            Self::Aggregating => write!(f, "aggregating"),
            Self::Synthesizing => write!(f, "synthesizing"),
            Self::Writing => write!(f, "writing"),
        }
    }
}

/// Terminal errors a pipeline run can end with.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The topic was empty or whitespace-only. Not retried.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// The search backend kept failing after the retry budget was spent.
    #[error("search backend unavailable after {attempts} attempts: {message}")]
    SearchUnavailable { attempts: u32, message: String },

    /// A backend call exceeded its deadline. Distinct from unavailability;
    /// not retried.
    #[error("{stage} stage timed out after {timeout:?}")]
    Timeout { stage: Stage, timeout: Duration },

    /// Every search returned zero usable results.
    #[error("no usable search results to synthesize a report from")]
    InsufficientEvidence,

    /// The generative backend failed while planning or synthesizing.
    #[error("{stage} backend error: {message}")]
    Backend { stage: Stage, message: String },

    /// The synthesized text did not match the required report structure.
    #[error("synthesized report failed validation: {0}")]
    MalformedReport(String),

    /// The report could not be persisted. Fatal; no partial file remains
    /// at the target path.
    #[error("failed to write report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The stage this error originated from.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidTopic(_) => Stage::Planning,
            Self::SearchUnavailable { .. } => Stage::Searching,
            Self::Timeout { stage, .. } => *stage,
            Self::InsufficientEvidence => Stage::Synthesizing,
            Self::Backend { stage, .. } => *stage,
            Self::MalformedReport(_) => Stage::Synthesizing,
            Self::Write { .. } => Stage::Writing,
        }
    }
}
