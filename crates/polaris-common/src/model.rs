use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resource shape of one inference server job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceShape {
    /// Number of nodes the job spans.
    pub num_nodes: u32,

    /// GPUs requested on each node.
    pub gpus_per_node: u32,

    /// CPUs allocated to the server task.
    pub cpus_per_task: u32,

    /// Memory per node, in Slurm syntax (e.g. "64G").
    pub mem_per_node: String,
}

/// One entry of the model registry — the launch defaults for a named model.
///
/// Registry entries are read-only from the client's perspective; the registry
/// file is maintained by cluster operators. Fields the registry omits fall
/// back to the cluster-wide defaults during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Model name, unique within the registry (e.g. "llama-7b").
    /// Filled from the registry map key, not from the entry body.
    #[serde(default)]
    pub name: String,

    /// Model family / architecture (e.g. "llama").
    pub family: String,

    /// Variant within the family (e.g. "7b-chat").
    pub variant: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_nodes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus_per_node: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus_per_task: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_per_node: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<String>,

    /// Job time limit in Slurm syntax (e.g. "08:00:00").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<String>,

    /// Container image the server runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,

    /// Parent directory containing the model weights; the weights path for
    /// a model is `{parent}/{name}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_weights_parent_dir: Option<PathBuf>,
}
