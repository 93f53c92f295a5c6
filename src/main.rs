//! Scribe - research report CLI entry point.
//!
//! Usage: `scribe "<topic>" [output-path]`
//!
//! Without an explicit output path the report lands in
//! `reports/<topic-slug>.md`.

use std::path::PathBuf;

use scribe_agent::{config::Config, pipeline::Pipeline, report::ReportRequest};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(topic) = args.next() else {
        eprintln!("usage: scribe \"<topic>\" [output-path]");
        std::process::exit(2);
    };
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&topic));

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "loaded configuration: planner={} synthesis={}",
        config.synthesis.planner_model, config.synthesis.synthesis_model
    );

    let pipeline = Pipeline::new(config);
    let request = ReportRequest::new(topic, output_path);

    match pipeline.run(&request).await {
        Ok(path) => {
            info!("report written to {}", path.display());
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("pipeline failed during {}: {}", e.stage(), e);
            Err(e.into())
        }
    }
}

/// Default output path: `reports/<topic-slug>.md`.
fn default_output_path(topic: &str) -> PathBuf {
    PathBuf::from("reports").join(format!("{}.md", slugify(topic)))
}

/// Lowercase alphanumeric runs joined by hyphens.
fn slugify(topic: &str) -> String {
    let slug: String = topic
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(
            slugify("Quantum Computing: 2026 update!"),
            "quantum-computing-2026-update"
        );
        assert_eq!(slugify("???"), "report");
    }

    #[test]
    fn default_path_is_under_reports() {
        assert_eq!(
            default_output_path("fusion energy"),
            PathBuf::from("reports/fusion-energy.md")
        );
    }
}
