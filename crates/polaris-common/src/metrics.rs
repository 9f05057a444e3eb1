use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One capture of the inference server's metrics endpoint, flattened into a
/// name → value mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub collected_at: DateTime<Utc>,
    pub metrics: BTreeMap<String, f64>,
}

/// Result of a metrics query. Unavailability is expected and recoverable
/// (job not running, endpoint unreachable), so it is modeled as data rather
/// than as an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsResponse {
    Snapshot(MetricsSnapshot),
    Unavailable(String),
}

impl MetricsResponse {
    pub fn is_available(&self) -> bool {
        matches!(self, MetricsResponse::Snapshot(_))
    }
}
