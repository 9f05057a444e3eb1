//! The client facade: one object exposing the full operation surface
//! (launch, batch launch, status, shutdown, list, metrics, cleanup).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use polaris_common::{
    BatchLaunchSpec, CleanupFilters, CleanupReport, ClientError, ClusterConfig, JobStatus,
    LaunchOptions, LaunchOutcome, LaunchResponse, MetricsResponse, ModelEntry, Result,
};

use crate::launcher;
use crate::metrics;
use crate::reconcile;
use crate::registry::ModelRegistry;
use crate::resolver;
use crate::slurm::{Scheduler, SlurmScheduler};

/// Per-model override sections of a batch configuration file.
#[derive(Debug, Default, Deserialize)]
struct BatchConfigFile {
    #[serde(default)]
    models: BTreeMap<String, LaunchOptions>,
}

/// Lifecycle client for inference-server jobs. Holds no mutable state:
/// every operation is a fresh computation from its inputs and the current
/// external state (scheduler queue, filesystem, server endpoint).
pub struct PolarisClient {
    registry: ModelRegistry,
    cluster: ClusterConfig,
    scheduler: Box<dyn Scheduler>,
    http: reqwest::Client,
}

impl PolarisClient {
    /// Create a client session: loads the model registry once and wires up
    /// the real Slurm scheduler.
    pub fn new(models_file: &Path, cluster: ClusterConfig) -> Result<Self> {
        let registry = ModelRegistry::load(models_file)?;
        Ok(Self::with_scheduler(
            registry,
            cluster,
            Box::new(SlurmScheduler::default()),
        ))
    }

    /// Create a client with an explicit scheduler implementation.
    pub fn with_scheduler(
        registry: ModelRegistry,
        cluster: ClusterConfig,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            registry,
            cluster,
            scheduler,
            http: metrics::http_client(),
        }
    }

    fn log_root(&self) -> &Path {
        &self.cluster.default_log_root
    }

    /// Launch one model. Fatal on resolution or submission failure.
    pub async fn launch(&self, model_name: &str, opts: &LaunchOptions) -> Result<LaunchResponse> {
        let spec = resolver::resolve(&self.registry, &self.cluster, model_name, opts)?;
        let handle = launcher::submit(self.scheduler.as_ref(), &spec).await?;
        Ok(LaunchResponse {
            job_id: handle.job_id,
            model_name: handle.model_name,
            log_dir: handle.log_dir,
            spec,
        })
    }

    /// Launch several models sequentially, optionally taking per-model
    /// overrides from a batch configuration file. Entries fail
    /// independently; the returned outcomes preserve input order.
    pub async fn launch_batch(
        &self,
        model_names: &[String],
        batch_config: Option<&Path>,
    ) -> Result<Vec<LaunchOutcome>> {
        for (i, name) in model_names.iter().enumerate() {
            if model_names[..i].contains(name) {
                return Err(ClientError::InvalidOption {
                    field: "model_names",
                    reason: format!("duplicate model name '{name}' in batch"),
                });
            }
        }

        let config = match batch_config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_yaml::from_str::<BatchConfigFile>(&text).map_err(|e| {
                    ClientError::InvalidOption {
                        field: "batch_config",
                        reason: e.to_string(),
                    }
                })?
            }
            None => BatchConfigFile::default(),
        };

        // Resolve every entry first; failures occupy their slot so the
        // outcome order matches the input order.
        let default_opts = LaunchOptions::default();
        let mut slots: Vec<Option<LaunchOutcome>> = Vec::with_capacity(model_names.len());
        let mut specs = Vec::new();
        for name in model_names {
            let opts = config.models.get(name).unwrap_or(&default_opts);
            match resolver::resolve(&self.registry, &self.cluster, name, opts) {
                Ok(spec) => {
                    specs.push(spec);
                    slots.push(None);
                }
                Err(e) => slots.push(Some(LaunchOutcome {
                    model_name: name.clone(),
                    job_id: None,
                    log_dir: None,
                    error: Some(e.to_string()),
                })),
            }
        }

        let batch = BatchLaunchSpec {
            source: batch_config.map(Path::to_path_buf).unwrap_or_default(),
            specs,
        };
        let mut submitted = launcher::submit_batch(self.scheduler.as_ref(), &batch)
            .await
            .into_iter();

        let mut outcomes = Vec::with_capacity(model_names.len());
        for slot in slots {
            match slot {
                Some(outcome) => outcomes.push(outcome),
                None => {
                    if let Some(outcome) = submitted.next() {
                        outcomes.push(outcome);
                    }
                }
            }
        }
        Ok(outcomes)
    }

    /// Derive the current logical status of a job.
    pub async fn get_status(&self, job_id: u64) -> Result<JobStatus> {
        reconcile::get_status(self.scheduler.as_ref(), self.log_root(), job_id).await
    }

    /// Cancel a job. Idempotent: an already-terminal job is success.
    pub async fn shutdown(&self, job_id: u64) -> Result<()> {
        reconcile::shutdown(self.scheduler.as_ref(), job_id).await
    }

    /// All registry entries, ordered by name.
    pub fn list_models(&self) -> Vec<&ModelEntry> {
        self.registry.list().collect()
    }

    /// Default configuration of one model.
    pub fn get_model_config(&self, model_name: &str) -> Result<&ModelEntry> {
        self.registry
            .lookup(model_name)
            .ok_or_else(|| ClientError::UnknownModel(model_name.to_string()))
    }

    /// One stateless metrics poll. Returns status text instead of a
    /// snapshot whenever the server cannot be queried.
    pub async fn get_metrics(&self, job_id: u64) -> Result<MetricsResponse> {
        let status = self.get_status(job_id).await?;
        Ok(metrics::get_metrics(&self.http, &status).await)
    }

    /// Remove (or, in a dry run, list) log directories matching the
    /// filters. `log_root` overrides the cluster default log root.
    pub async fn cleanup_logs(
        &self,
        log_root: Option<&Path>,
        filters: &CleanupFilters,
        dry_run: bool,
    ) -> Result<CleanupReport> {
        let root: PathBuf = log_root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.log_root().to_path_buf());
        crate::cleanup::cleanup(&root, filters, dry_run).await
    }
}
