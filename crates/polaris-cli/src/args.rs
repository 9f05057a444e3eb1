use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "polaris")]
#[command(about = "Launch and manage LLM inference servers on a Slurm cluster", long_about = None)]
pub struct Args {
    /// Model registry file
    #[arg(long, env = "POLARIS_MODELS_FILE")]
    pub models_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch a model on the cluster
    Launch {
        /// Name of the model to launch
        model_name: String,

        /// The model family
        #[arg(long)]
        model_family: Option<String>,

        /// The model variant
        #[arg(long)]
        model_variant: Option<String>,

        /// Compute partition
        #[arg(long)]
        partition: Option<String>,

        /// Number of nodes, defaults to the model's suggested allocation
        #[arg(long)]
        num_nodes: Option<u32>,

        /// GPUs per node, defaults to the model's suggested allocation
        #[arg(long)]
        gpus_per_node: Option<u32>,

        /// CPUs for the server task
        #[arg(long)]
        cpus_per_task: Option<u32>,

        /// Memory per node (e.g. "64G")
        #[arg(long)]
        mem_per_node: Option<String>,

        /// Charge resources used by this job to the specified account
        #[arg(long)]
        account: Option<String>,

        /// Quality of service
        #[arg(long)]
        qos: Option<String>,

        /// Exclude certain nodes from the resources granted to the job
        #[arg(long)]
        exclude: Option<String>,

        /// Request a specific list of nodes for deployment
        #[arg(long)]
        nodelist: Option<String>,

        /// Time limit for the job; must comply with QoS limits
        #[arg(long)]
        time_limit: Option<String>,

        /// Additional container bind paths, comma separated
        #[arg(long)]
        bind: Option<String>,

        /// Engine arguments, comma separated
        /// (e.g. '--max-model-len=8192,--max-num-seqs=256')
        #[arg(long)]
        engine_args: Option<String>,

        /// Path to a virtual environment used inside the container
        #[arg(long)]
        venv: Option<PathBuf>,

        /// Log directory root
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Parent directory containing model weights
        #[arg(long)]
        model_weights_parent_dir: Option<PathBuf>,

        /// Container image for the inference server
        #[arg(long)]
        image: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Launch multiple models in a batch
    BatchLaunch {
        /// Names of the models to launch
        #[arg(required = true)]
        model_names: Vec<String>,

        /// Batch configuration file with per-model overrides
        #[arg(long)]
        batch_config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get the status of a job
    Status {
        job_id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Shut down a running model
    Shutdown { job_id: u64 },

    /// List available models, or show one model's default configuration
    List {
        model_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show real-time performance metrics for a running model
    Metrics {
        job_id: u64,

        /// Keep polling every two seconds until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// Clean up log directories matching the given filters
    Cleanup {
        /// Log directory root to scan
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Filter by model family
        #[arg(long)]
        model_family: Option<String>,

        /// Filter by model name
        #[arg(long)]
        model_name: Option<String>,

        /// Only remove logs with this exact job id
        #[arg(long)]
        job_id: Option<u64>,

        /// Remove logs with job id less than this value
        #[arg(long)]
        before_job_id: Option<u64>,

        /// List matching directories without deleting
        #[arg(long)]
        dry_run: bool,
    },
}
