use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Scheduler-assigned identity of a launched job. Created at submission,
/// immutable afterwards; the sole key for status, metrics and shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: u64,
    pub model_name: String,
    pub log_dir: PathBuf,
}

/// Logical state of a job, derived on every query from scheduler queue
/// state and log-file side effects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// The scheduler has not yet indexed the job and no terminal marker
    /// exists — a normal race right after submission, not a failure.
    Unknown,
    /// Accepted by the scheduler, waiting for resources.
    Pending,
    /// Resources granted, container starting, server not yet confirmed.
    Launching,
    /// Server confirmed serving.
    Running,
    Completed,
    Failed,
    Cancelled,
    Shutdown,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled | JobState::Shutdown
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Unknown => "UNKNOWN",
            JobState::Pending => "PENDING",
            JobState::Launching => "LAUNCHING",
            JobState::Running => "RUNNING",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
            JobState::Shutdown => "SHUTDOWN",
        };
        f.write_str(s)
    }
}

/// Derived status of one job. Recomputed on every query, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: u64,

    /// Model name recovered from the log directory naming convention, when
    /// the log directory could be located.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    pub state: JobState,

    /// Diagnostic text: the scheduler's pending reason, or the failure
    /// excerpt captured from the log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Server base URL, known once the readiness marker has been seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl JobStatus {
    /// Human-readable one-line description, used verbatim as the metrics
    /// fallback text when the server is not reachable.
    pub fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("job {} is {} ({})", self.job_id, self.state, reason),
            None => format!("job {} is {}", self.job_id, self.state),
        }
    }
}
