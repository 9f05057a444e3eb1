use std::path::PathBuf;

/// Cluster-wide launch defaults and resource maxima.
///
/// Constructed once at process start and passed into the resolver; no core
/// logic reads ambient globals. All values here sit at the bottom of the
/// resolution precedence: user override > registry entry > this config.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub max_num_nodes: u32,
    pub max_gpus_per_node: u32,
    pub max_cpus_per_task: u32,

    pub default_cpus_per_task: u32,
    pub default_mem_per_node: String,
    pub default_partition: String,
    pub default_qos: String,
    pub default_time_limit: String,

    /// Default container image for the inference server.
    pub default_image: PathBuf,

    /// Default parent directory of model weights.
    pub default_weights_parent_dir: PathBuf,

    /// Root directory for per-job log subdirectories.
    pub default_log_root: PathBuf,

    /// Cluster-shared model registry file.
    pub models_file: PathBuf,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            max_num_nodes: 16,
            max_gpus_per_node: 8,
            max_cpus_per_task: 128,
            default_cpus_per_task: 16,
            default_mem_per_node: "64G".to_string(),
            default_partition: "gpu".to_string(),
            default_qos: "normal".to_string(),
            default_time_limit: "08:00:00".to_string(),
            default_image: PathBuf::from("/opt/containers/polaris-inference.sif"),
            default_weights_parent_dir: PathBuf::from("/model-weights"),
            default_log_root: home.join(".polaris-logs"),
            models_file: PathBuf::from("/model-weights/polaris-shared/models.yaml"),
        }
    }
}
