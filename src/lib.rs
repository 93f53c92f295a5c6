//! # Scribe Agent
//!
//! A research-report generator built as a fixed agentic pipeline.
//!
//! This library provides:
//! - A query planner that fans a topic out into distinct search queries
//! - A retrying search client backed by the Exa API
//! - An evidence aggregator that dedupes results by normalized URL
//! - A persona-steered report synthesizer with structural validation
//! - An atomic markdown writer
//!
//! ## Architecture
//!
//! The pipeline is a single linear sequence with no feedback loops:
//! 1. Plan N queries from the topic
//! 2. Run the searches concurrently
//! 3. Merge results into one deduplicated evidence set
//! 4. Synthesize a cited report from the evidence
//! 5. Write the report to disk
//!
//! Any stage failure aborts the rest of the run; the resulting error
//! names the failing stage.
//!
//! ## Example
//!
//! ```rust,ignore
//! use scribe_agent::{config::Config, pipeline::Pipeline, report::ReportRequest};
//!
//! let config = Config::from_env()?;
//! let pipeline = Pipeline::new(config);
//! let request = ReportRequest::new("quantum computing updates", "reports/quantum.md");
//! let path = pipeline.run(&request).await?;
//! ```

pub mod config;
pub mod error;
pub mod evidence;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod writer;

pub use config::Config;
pub use error::{PipelineError, Stage};
