use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::ResourceShape;

/// User-supplied launch overrides. Every field is optional; anything left
/// unset falls back to the registry entry for the model, then to the
/// cluster defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_variant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_nodes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus_per_node: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus_per_task: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_per_node: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<String>,

    /// Nodes to exclude from the allocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Specific nodes to request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodelist: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<String>,

    /// Extra container bind paths, comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Extra engine arguments, comma separated
    /// (e.g. "--max-model-len=8192,--max-num-seqs=256").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_args: Option<String>,

    /// Virtual environment activated inside the container before the server
    /// starts, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venv: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_weights_parent_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

/// Fully resolved parameters for one job.
///
/// Produced by the resolver and consumed by the submission engine; not
/// retained after submission. Resource values are already validated against
/// the cluster maxima. `account`, `exclude` and `nodelist` are genuinely
/// optional placement constraints — Slurm treats their absence as "no
/// constraint", so no sentinel remains unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub model_name: String,
    pub model_family: String,
    pub model_variant: String,

    pub resources: ResourceShape,

    pub partition: String,
    pub qos: String,
    pub time_limit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodelist: Option<String>,

    pub image: PathBuf,

    /// Full path to the model weights (`{parent}/{model_name}`).
    pub weights_path: PathBuf,

    /// Extra container bind paths, already split and validated.
    pub binds: Vec<String>,

    /// Extra engine arguments, already split and validated.
    pub engine_args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venv: Option<PathBuf>,

    /// Root under which this job's log directory is created.
    pub log_root: PathBuf,
}

/// An ordered batch of launch specs sharing one batch configuration source.
#[derive(Debug, Clone)]
pub struct BatchLaunchSpec {
    /// The batch configuration file the entries were resolved from.
    pub source: PathBuf,
    pub specs: Vec<LaunchSpec>,
}

/// Result of a successful single launch: the job handle plus the resolved
/// spec, returned so the caller can display what was actually submitted.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchResponse {
    pub job_id: u64,
    pub model_name: String,
    pub log_dir: PathBuf,
    pub spec: LaunchSpec,
}

/// Per-entry outcome of a batch launch. Entries fail independently; the
/// aggregate result preserves input order.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchOutcome {
    pub model_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LaunchOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}
