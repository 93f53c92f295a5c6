//! The report pipeline - plan, search, aggregate, synthesize, write.
//!
//! A fixed linear sequence with no feedback loops:
//! 1. Plan N distinct queries from the topic
//! 2. Run the searches concurrently, fail-fast
//! 3. Merge per-query results into one deduplicated evidence set
//! 4. Synthesize a cited report and validate its structure
//! 5. Persist the report atomically

mod planner;
mod prompt;
mod runner;
mod synthesizer;

pub use planner::QueryPlanner;
pub use runner::Pipeline;
pub use synthesizer::ReportSynthesizer;
