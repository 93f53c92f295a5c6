//! Report persistence.
//!
//! The rendered markdown goes to a sibling temp file first and is renamed
//! into place, so a failed write never leaves a partial file at the
//! target path.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::report::Report;

/// Write the rendered report to `path`, creating parent directories.
pub async fn write(report: &Report, path: &Path) -> Result<(), PipelineError> {
    let markdown = report.to_markdown();
    let wrap = |source: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(wrap)?;
        }
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, markdown).await.map_err(wrap)?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(wrap(e));
    }

    Ok(())
}

/// Sibling temp path: `report.md` becomes `report.md.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "report.md".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::evidence::SearchResult;
    use crate::report::{Reference, ReportSection, DEFAULT_BYLINE};

    fn sample_report() -> Report {
        Report {
            title: "Title".to_string(),
            executive_summary: "Summary.".to_string(),
            sections: vec![ReportSection {
                heading: "Introduction".to_string(),
                body: "Body.".to_string(),
            }],
            takeaways: vec!["One".into(), "Two".into(), "Three".into()],
            references: vec![Reference {
                result: SearchResult {
                    url: "https://a.com/".to_string(),
                    title: "Source".to_string(),
                    snippet: "s".to_string(),
                    published_at: None,
                    source_query: "q".to_string(),
                },
                note: "why it matters".to_string(),
            }],
            byline: DEFAULT_BYLINE.to_string(),
            generated_on: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
        }
    }

    #[tokio::test]
    async fn writes_markdown_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/report.md");

        write(&sample_report(), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Title\n"));
        assert!(written.contains("## References"));
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn unwritable_target_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file in the way").unwrap();
        let path = blocker.join("report.md");

        let err = write(&sample_report(), &path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn rename_failure_cleans_up_the_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // Target is an existing non-empty directory, so the rename fails.
        let path = dir.path().join("report.md");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupant"), "x").unwrap();

        let err = write(&sample_report(), &path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(
            temp_path(Path::new("reports/out.md")),
            PathBuf::from("reports/out.md.tmp")
        );
    }
}
