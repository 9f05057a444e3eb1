//! Subprocess interface to the Slurm scheduler: submit, queue query, cancel.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use polaris_common::{ClientError, Result};

/// Queue state of a job as reported by the scheduler: the raw state token
/// (e.g. "PENDING", "RUNNING") plus the scheduler's reason text, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueState {
    pub state: String,
    pub reason: Option<String>,
}

/// The scheduler's submit/query/cancel primitives. The production
/// implementation shells out to Slurm; tests substitute fakes.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Submit a job script, returning the assigned job id.
    async fn submit(&self, script: &Path) -> Result<u64>;

    /// Queue state for a job, or None when the scheduler has no record of
    /// it (not yet indexed, or already left the queue).
    async fn queue_state(&self, job_id: u64) -> Result<Option<QueueState>>;

    /// Cancel a job. Cancelling a job that is already gone is success.
    async fn cancel(&self, job_id: u64) -> Result<()>;
}

/// Slurm implementation over `sbatch`, `squeue` and `scancel` subprocesses,
/// each bounded by an explicit timeout.
pub struct SlurmScheduler {
    sbatch: String,
    squeue: String,
    scancel: String,
    timeout: Duration,
}

impl Default for SlurmScheduler {
    fn default() -> Self {
        Self {
            sbatch: "sbatch".to_string(),
            squeue: "squeue".to_string(),
            scancel: "scancel".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SlurmScheduler {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<std::process::Output> {
        let fut = Command::new(program).args(args).output();
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(ClientError::Scheduler(format!("failed to run {program}: {e}"))),
            Err(_) => Err(ClientError::Scheduler(format!(
                "{program} did not respond within {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl Scheduler for SlurmScheduler {
    async fn submit(&self, script: &Path) -> Result<u64> {
        let args = vec![script.display().to_string()];
        let output = self.run(&self.sbatch, &args).await.map_err(|e| match e {
            ClientError::Scheduler(msg) => ClientError::Submission(msg),
            other => other,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClientError::Submission(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_sbatch_stdout(&stdout).ok_or_else(|| {
            ClientError::Submission(format!(
                "could not parse job id from sbatch output: {:?}",
                stdout.trim()
            ))
        })
    }

    async fn queue_state(&self, job_id: u64) -> Result<Option<QueueState>> {
        let args = vec![
            "-h".to_string(),
            "-j".to_string(),
            job_id.to_string(),
            "-o".to_string(),
            "%T|%R".to_string(),
        ];
        let output = self.run(&self.squeue, &args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // squeue errors on ids it has never seen; that is "no record",
            // not a query failure.
            if stderr.contains("Invalid job id") {
                return Ok(None);
            }
            return Err(ClientError::Scheduler(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_squeue_line(&stdout))
    }

    async fn cancel(&self, job_id: u64) -> Result<()> {
        let args = vec![job_id.to_string()];
        let output = self.run(&self.scancel, &args).await.map_err(|e| {
            ClientError::Shutdown {
                job_id,
                reason: e.to_string(),
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Idempotent: a job that already left the queue is success.
            if stderr.contains("Invalid job id") {
                return Ok(());
            }
            return Err(ClientError::Shutdown {
                job_id,
                reason: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Parse the job id from sbatch output. Handles the default
/// "Submitted batch job <id>" banner and `--parsable` style "<id>[;cluster]".
fn parse_sbatch_stdout(stdout: &str) -> Option<u64> {
    for line in stdout.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Submitted batch job") {
            if let Ok(id) = rest.trim().parse() {
                return Some(id);
            }
        }
        if let Some(first) = line.split(';').next() {
            if let Ok(id) = first.parse() {
                return Some(id);
            }
        }
    }
    None
}

/// Parse one `squeue -h -o "%T|%R"` line into a queue state. Slurm prints
/// "None" or "(null)" when there is no reason.
fn parse_squeue_line(stdout: &str) -> Option<QueueState> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (state, reason) = match line.split_once('|') {
        Some((state, reason)) => (state.trim(), reason.trim()),
        None => (line, ""),
    };
    if state.is_empty() {
        return None;
    }
    let reason = match reason {
        "" | "None" | "(null)" => None,
        r => Some(r.to_string()),
    };
    Some(QueueState {
        state: state.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sbatch_banner_and_parsable_output() {
        assert_eq!(parse_sbatch_stdout("Submitted batch job 12345\n"), Some(12345));
        assert_eq!(parse_sbatch_stdout("9876;cluster-a\n"), Some(9876));
        assert_eq!(parse_sbatch_stdout("9876\n"), Some(9876));
        assert_eq!(parse_sbatch_stdout("sbatch: error: no partition\n"), None);
        assert_eq!(parse_sbatch_stdout(""), None);
    }

    #[test]
    fn parses_squeue_states_and_reasons() {
        assert_eq!(
            parse_squeue_line("PENDING|Resources\n"),
            Some(QueueState {
                state: "PENDING".into(),
                reason: Some("Resources".into()),
            })
        );
        assert_eq!(
            parse_squeue_line("RUNNING|None\n"),
            Some(QueueState {
                state: "RUNNING".into(),
                reason: None,
            })
        );
        assert_eq!(parse_squeue_line("\n"), None);
        assert_eq!(parse_squeue_line(""), None);
    }
}
