//! Status derivation: reconcile scheduler queue state with log-file side
//! effects into one logical job status.
//!
//! The two sources evolve independently and disagree in normal operation:
//! right after submission the scheduler may not have indexed the job yet,
//! and right after exit the queue entry disappears before anyone reads the
//! terminal marker. Derivation therefore never assumes failure from
//! silence — both sources silent yields UNKNOWN.

use std::path::Path;

use polaris_common::{JobState, JobStatus, Result};

use crate::logs::{self, LogView, TerminalMarker};
use crate::slurm::{QueueState, Scheduler};

/// Derive the logical status of a job. Recomputed from scratch on every
/// call; nothing is cached.
pub async fn get_status(
    scheduler: &dyn Scheduler,
    log_root: &Path,
    job_id: u64,
) -> Result<JobStatus> {
    let job_dir = logs::find_job_log_dir(log_root, job_id);
    let model_name = job_dir
        .as_deref()
        .and_then(logs::parse_log_dir)
        .map(|id| id.model_name);

    let view = match &job_dir {
        Some(dir) => match tokio::fs::read_to_string(dir.join(logs::SERVER_LOG_FILE)).await {
            Ok(text) => logs::scan_log(&text),
            // Log file not created yet: the container has not started.
            Err(_) => LogView::default(),
        },
        None => LogView::default(),
    };

    let queue = scheduler.queue_state(job_id).await?;
    let (state, reason, base_url) = derive(&view, queue.as_ref());

    Ok(JobStatus {
        job_id,
        model_name,
        state,
        reason,
        base_url,
    })
}

/// Cancel a job. Always attempted regardless of the current derivable
/// status; cancelling an already-terminal job is success.
pub async fn shutdown(scheduler: &dyn Scheduler, job_id: u64) -> Result<()> {
    scheduler.cancel(job_id).await?;
    tracing::info!(job_id, "cancel issued");
    Ok(())
}

fn derive(
    view: &LogView,
    queue: Option<&QueueState>,
) -> (JobState, Option<String>, Option<String>) {
    // A terminal marker is authoritative: once written it never goes away,
    // which keeps the observed state sequence monotone even while the job
    // lingers in the queue's COMPLETING window.
    if let Some(terminal) = &view.terminal {
        return match terminal {
            TerminalMarker::Complete => (JobState::Completed, None, None),
            TerminalMarker::Failed(excerpt) => {
                let reason = (!excerpt.is_empty()).then(|| excerpt.clone());
                (JobState::Failed, reason, None)
            }
            TerminalMarker::Cancelled => (JobState::Cancelled, None, None),
            TerminalMarker::Shutdown => (JobState::Shutdown, None, None),
        };
    }

    let Some(queue) = queue else {
        // Not in the queue and no terminal marker: the scheduler may simply
        // lag behind a fresh submission. Never assume failure here.
        return (
            JobState::Unknown,
            Some("job not yet visible to the scheduler and no terminal marker found".to_string()),
            None,
        );
    };

    match queue.state.as_str() {
        "PENDING" | "CONFIGURING" | "SUSPENDED" | "REQUEUED" | "REQUEUE_HOLD" | "RESIZING" => {
            (JobState::Pending, queue.reason.clone(), None)
        }
        "RUNNING" | "COMPLETING" => match &view.ready_url {
            Some(url) => (JobState::Running, None, Some(url.clone())),
            None => (JobState::Launching, None, None),
        },
        "COMPLETED" => (JobState::Completed, queue.reason.clone(), None),
        "CANCELLED" => (JobState::Cancelled, queue.reason.clone(), None),
        "FAILED" | "TIMEOUT" | "NODE_FAIL" | "OUT_OF_MEMORY" | "BOOT_FAIL" | "DEADLINE"
        | "PREEMPTED" => (JobState::Failed, queue.reason.clone(), None),
        other => (
            JobState::Unknown,
            Some(format!("unrecognized scheduler state '{other}'")),
            None,
        ),
    }
}
