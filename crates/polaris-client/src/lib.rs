//! Lifecycle client for LLM inference servers run as Slurm jobs.
//!
//! The client resolves launch configuration from a model registry plus user
//! overrides, submits and tracks scheduler jobs, derives a job's logical
//! state from scheduler output and log-file side effects, polls a running
//! server for live metrics, and prunes log artifacts by job and model
//! identity.

pub mod cleanup;
pub mod client;
pub mod launcher;
pub mod logs;
pub mod metrics;
pub mod reconcile;
pub mod registry;
pub mod resolver;
pub mod script;
pub mod slurm;

pub use client::PolarisClient;
pub use registry::ModelRegistry;
pub use slurm::{QueueState, Scheduler, SlurmScheduler};
