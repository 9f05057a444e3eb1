//! Job submission: render the spec, place the script, invoke the scheduler.

use polaris_common::{BatchLaunchSpec, JobHandle, LaunchOutcome, LaunchSpec, Result};
use tokio::fs;

use crate::script::render_script;
use crate::slurm::Scheduler;

/// Submit one resolved spec as a scheduler job.
///
/// The script is first written under `{log_root}/{family}/{name}`; once the
/// scheduler assigns a job id, the per-job directory is created and the
/// script moved into it, completing the naming convention the status
/// reconciler and cleanup engine rely on.
pub async fn submit(scheduler: &dyn Scheduler, spec: &LaunchSpec) -> Result<JobHandle> {
    let model_dir = spec
        .log_root
        .join(&spec.model_family)
        .join(&spec.model_name);
    fs::create_dir_all(&model_dir).await?;

    let script_name = format!("{}.sbatch", spec.model_name);
    let staging_path = model_dir.join(&script_name);
    fs::write(&staging_path, render_script(spec, &model_dir)).await?;

    let job_id = scheduler.submit(&staging_path).await?;

    let job_dir = model_dir.join(job_id.to_string());
    fs::create_dir_all(&job_dir).await?;
    fs::rename(&staging_path, job_dir.join(&script_name)).await?;

    tracing::info!(
        job_id,
        model = %spec.model_name,
        log_dir = %job_dir.display(),
        "job submitted"
    );

    Ok(JobHandle {
        job_id,
        model_name: spec.model_name.clone(),
        log_dir: job_dir,
    })
}

/// Submit a batch sequentially, in order. One entry failing does not abort
/// the rest; every entry's outcome is reported independently.
pub async fn submit_batch(
    scheduler: &dyn Scheduler,
    batch: &BatchLaunchSpec,
) -> Vec<LaunchOutcome> {
    let mut outcomes = Vec::with_capacity(batch.specs.len());
    for spec in &batch.specs {
        let outcome = match submit(scheduler, spec).await {
            Ok(handle) => LaunchOutcome {
                model_name: spec.model_name.clone(),
                job_id: Some(handle.job_id),
                log_dir: Some(handle.log_dir),
                error: None,
            },
            Err(e) => {
                tracing::warn!(model = %spec.model_name, error = %e, "batch entry failed");
                LaunchOutcome {
                    model_name: spec.model_name.clone(),
                    job_id: None,
                    log_dir: None,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}
