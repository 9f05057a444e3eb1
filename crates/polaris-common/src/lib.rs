pub mod cleanup;
pub mod cluster;
pub mod error;
pub mod job;
pub mod launch;
pub mod metrics;
pub mod model;
pub mod telemetry;

pub use cleanup::{CleanupFilters, CleanupReport};
pub use cluster::ClusterConfig;
pub use error::{ClientError, Result};
pub use job::{JobHandle, JobState, JobStatus};
pub use launch::{BatchLaunchSpec, LaunchOptions, LaunchOutcome, LaunchResponse, LaunchSpec};
pub use metrics::{MetricsResponse, MetricsSnapshot};
pub use model::{ModelEntry, ResourceShape};
