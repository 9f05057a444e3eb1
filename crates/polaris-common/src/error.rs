use std::path::PathBuf;

/// Result type alias for polaris client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Typed error taxonomy of the lifecycle client.
///
/// Status and metrics unavailability are deliberately NOT here — both are
/// valid states communicated as data (`JobState::Unknown`,
/// `MetricsResponse::Unavailable`), because scheduler, log and server
/// visibility lag is a normal operating condition.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to load model registry from {path}: {reason}")]
    RegistryLoad { path: PathBuf, reason: String },

    #[error("model '{0}' not found in registry and overrides do not form a complete specification (family, variant and resource shape required)")]
    UnknownModel(String),

    #[error("invalid value {value} for {field}: must be between 1 and {max}")]
    InvalidResource {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("invalid launch option {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },

    #[error("job submission failed: {0}")]
    Submission(String),

    #[error("scheduler query failed: {0}")]
    Scheduler(String),

    #[error("failed to cancel job {job_id}: {reason}")]
    Shutdown { job_id: u64, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
