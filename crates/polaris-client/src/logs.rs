//! Log directory conventions and the marker grammar shared between this
//! client and the job scripts it renders.
//!
//! Per-job artifacts live at `{log_root}/{family}/{model_name}/{job_id}/`:
//! the rendered sbatch script plus the runtime `server.log`. Both sides of
//! the contract are owned by this crate — the script emitted by
//! [`crate::script::render_script`] is what writes the markers — so the
//! grammar below is stable:
//!
//! - `POLARIS SERVER READY url=<base_url>` — server confirmed serving
//! - `POLARIS JOB COMPLETE` — normal exit
//! - `POLARIS JOB FAILED: <excerpt>` — error exit
//! - `POLARIS JOB CANCELLED` — scheduler preemption / external cancel
//! - `POLARIS JOB SHUTDOWN` — graceful stop via `scancel` (SIGTERM trap)
//!
//! A marker only counts when the full prefix is present, so a truncated
//! final line of a log still being appended simply does not match yet.

use std::path::{Path, PathBuf};

pub const SERVER_LOG_FILE: &str = "server.log";

pub const READY_MARKER: &str = "POLARIS SERVER READY url=";
pub const COMPLETE_MARKER: &str = "POLARIS JOB COMPLETE";
pub const FAILED_MARKER: &str = "POLARIS JOB FAILED:";
pub const CANCELLED_MARKER: &str = "POLARIS JOB CANCELLED";
pub const SHUTDOWN_MARKER: &str = "POLARIS JOB SHUTDOWN";

/// Terminal outcome recorded in a job log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalMarker {
    Complete,
    Failed(String),
    Cancelled,
    Shutdown,
}

/// What a scan of one job log revealed.
#[derive(Debug, Clone, Default)]
pub struct LogView {
    /// Base URL from the most recent readiness marker.
    pub ready_url: Option<String>,
    /// Most recent terminal marker. Later markers win, so an error exit
    /// after a successful startup is still reported as failed.
    pub terminal: Option<TerminalMarker>,
}

/// Scan log text for readiness and terminal markers.
pub fn scan_log(text: &str) -> LogView {
    let mut view = LogView::default();
    for line in text.lines() {
        let line = line.trim();
        if let Some(url) = line.strip_prefix(READY_MARKER) {
            let url = url.trim();
            if !url.is_empty() {
                view.ready_url = Some(url.to_string());
            }
        } else if line == COMPLETE_MARKER {
            view.terminal = Some(TerminalMarker::Complete);
        } else if let Some(excerpt) = line.strip_prefix(FAILED_MARKER) {
            view.terminal = Some(TerminalMarker::Failed(excerpt.trim().to_string()));
        } else if line == CANCELLED_MARKER {
            view.terminal = Some(TerminalMarker::Cancelled);
        } else if line == SHUTDOWN_MARKER {
            view.terminal = Some(TerminalMarker::Shutdown);
        }
    }
    view
}

/// Identity encoded in a per-job log directory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirIdentity {
    pub model_family: String,
    pub model_name: String,
    pub job_id: u64,
}

/// Recover the job identity from a `{log_root}/{family}/{name}/{job_id}`
/// path. Returns None for paths that do not follow the convention.
pub fn parse_log_dir(path: &Path) -> Option<LogDirIdentity> {
    let job_id: u64 = path.file_name()?.to_str()?.parse().ok()?;
    let name_dir = path.parent()?;
    let model_name = name_dir.file_name()?.to_str()?.to_string();
    let model_family = name_dir.parent()?.file_name()?.to_str()?.to_string();
    Some(LogDirIdentity {
        model_family,
        model_name,
        job_id,
    })
}

/// Locate the log directory for a job by scanning two levels under the log
/// root. There is no auxiliary index; the naming convention is the index.
pub fn find_job_log_dir(log_root: &Path, job_id: u64) -> Option<PathBuf> {
    let job_dir_name = job_id.to_string();
    let families = std::fs::read_dir(log_root).ok()?;
    for family in families.flatten() {
        if !family.path().is_dir() {
            continue;
        }
        let Ok(names) = std::fs::read_dir(family.path()) else {
            continue;
        };
        for name in names.flatten() {
            let candidate = name.path().join(&job_dir_name);
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_picks_up_ready_url() {
        let view = scan_log(
            "starting server\nPOLARIS SERVER READY url=http://gpu-17:8080\nserving traffic\n",
        );
        assert_eq!(view.ready_url.as_deref(), Some("http://gpu-17:8080"));
        assert!(view.terminal.is_none());
    }

    #[test]
    fn later_terminal_marker_wins_over_ready() {
        let view = scan_log(
            "POLARIS SERVER READY url=http://gpu-17:8080\n\
             engine crashed\n\
             POLARIS JOB FAILED: CUDA out of memory\n",
        );
        assert_eq!(view.ready_url.as_deref(), Some("http://gpu-17:8080"));
        assert_eq!(
            view.terminal,
            Some(TerminalMarker::Failed("CUDA out of memory".into()))
        );
    }

    #[test]
    fn truncated_final_line_does_not_match() {
        let view = scan_log("booting\nPOLARIS SERVER REA");
        assert!(view.ready_url.is_none());
        assert!(view.terminal.is_none());
    }

    #[test]
    fn parse_log_dir_follows_convention() {
        let id = parse_log_dir(Path::new("/logs/llama/llama-7b/12345")).unwrap();
        assert_eq!(id.model_family, "llama");
        assert_eq!(id.model_name, "llama-7b");
        assert_eq!(id.job_id, 12345);

        assert!(parse_log_dir(Path::new("/logs/llama/llama-7b/notajob")).is_none());
    }

    #[test]
    fn find_job_log_dir_scans_the_tree() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("llama").join("llama-7b").join("42");
        std::fs::create_dir_all(&dir).unwrap();

        assert_eq!(find_job_log_dir(root.path(), 42), Some(dir));
        assert_eq!(find_job_log_dir(root.path(), 43), None);
    }
}
