//! Log cleanup: filtered scan of the log tree, with dry-run support and
//! per-entry failure isolation.

use std::path::{Path, PathBuf};

use polaris_common::{CleanupFilters, CleanupReport, Result};

use crate::logs;

/// Scan `{log_root}/{family}/{name}/{job_id}` directories, apply the
/// conjunctive filters, and delete the matches (or only report them when
/// `dry_run` is set). Directories that fail to delete are collected in the
/// report instead of aborting the remaining matches.
pub async fn cleanup(
    log_root: &Path,
    filters: &CleanupFilters,
    dry_run: bool,
) -> Result<CleanupReport> {
    let mut matched = collect_matches(log_root, filters)?;
    matched.sort();

    let mut report = CleanupReport {
        matched: matched.clone(),
        removed: Vec::new(),
        failed: Vec::new(),
        dry_run,
    };
    if dry_run {
        return Ok(report);
    }

    for dir in matched {
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!(dir = %dir.display(), "log directory removed");
                report.removed.push(dir);
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to remove log directory");
                report.failed.push((dir, e.to_string()));
            }
        }
    }
    Ok(report)
}

fn collect_matches(log_root: &Path, filters: &CleanupFilters) -> Result<Vec<PathBuf>> {
    let mut matched = Vec::new();
    // A missing log root means there is nothing to clean.
    let families = match std::fs::read_dir(log_root) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(matched),
        Err(e) => return Err(e.into()),
    };
    for family in families.flatten() {
        if !family.path().is_dir() {
            continue;
        }
        let Ok(names) = std::fs::read_dir(family.path()) else {
            continue;
        };
        for name in names.flatten() {
            if !name.path().is_dir() {
                continue;
            }
            let Ok(jobs) = std::fs::read_dir(name.path()) else {
                continue;
            };
            for job in jobs.flatten() {
                let path = job.path();
                if !path.is_dir() {
                    continue;
                }
                // Directories outside the naming convention are not ours to
                // delete.
                let Some(identity) = logs::parse_log_dir(&path) else {
                    continue;
                };
                if filters.matches(&identity.model_family, &identity.model_name, identity.job_id)
                {
                    matched.push(path);
                }
            }
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Jobs 100 and 101 in family-a, 102 in family-b, plus a stray
    /// non-numeric directory.
    fn fixture() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for (family, name, job) in [
            ("family-a", "model-x", 100u64),
            ("family-a", "model-x", 101),
            ("family-b", "model-y", 102),
        ] {
            let dir = root.path().join(family).join(name).join(job.to_string());
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(logs::SERVER_LOG_FILE), "POLARIS JOB COMPLETE\n").unwrap();
        }
        std::fs::create_dir_all(root.path().join("family-a").join("model-x").join("stray"))
            .unwrap();
        root
    }

    #[tokio::test]
    async fn filters_are_conjunctive() {
        let root = fixture();
        let filters = CleanupFilters {
            model_family: Some("family-a".into()),
            before_job_id: Some(101),
            ..Default::default()
        };
        let report = cleanup(root.path(), &filters, true).await.unwrap();
        assert_eq!(report.matched.len(), 1);
        assert!(report.matched[0].ends_with("family-a/model-x/100"));
    }

    #[tokio::test]
    async fn no_filters_matches_every_job_dir() {
        let root = fixture();
        let report = cleanup(root.path(), &CleanupFilters::default(), true)
            .await
            .unwrap();
        // The stray non-numeric directory is never matched.
        assert_eq!(report.matched.len(), 3);
    }

    #[tokio::test]
    async fn dry_run_leaves_the_tree_intact() {
        let root = fixture();
        let report = cleanup(root.path(), &CleanupFilters::default(), true)
            .await
            .unwrap();
        assert!(report.dry_run);
        assert!(report.removed.is_empty());
        for dir in &report.matched {
            assert!(dir.is_dir(), "dry run deleted {}", dir.display());
        }
    }

    #[tokio::test]
    async fn real_run_removes_matches() {
        let root = fixture();
        let filters = CleanupFilters {
            job_id: Some(102),
            ..Default::default()
        };
        let report = cleanup(root.path(), &filters, false).await.unwrap();
        assert_eq!(report.removed.len(), 1);
        assert!(report.failed.is_empty());
        assert!(!root.path().join("family-b").join("model-y").join("102").exists());
        // Unmatched directories survive.
        assert!(root.path().join("family-a").join("model-x").join("100").is_dir());
    }

    #[tokio::test]
    async fn missing_log_root_matches_nothing() {
        let report = cleanup(
            Path::new("/nonexistent/polaris-logs"),
            &CleanupFilters::default(),
            false,
        )
        .await
        .unwrap();
        assert!(report.matched.is_empty());
    }
}
