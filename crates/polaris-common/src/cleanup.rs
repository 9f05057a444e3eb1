use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Predicates selecting log directories for cleanup. All given filters are
/// conjunctive; no filters means every log directory under the root.
#[derive(Debug, Clone, Default)]
pub struct CleanupFilters {
    pub model_family: Option<String>,
    pub model_name: Option<String>,
    /// Match this exact job id.
    pub job_id: Option<u64>,
    /// Match job ids strictly less than this value.
    pub before_job_id: Option<u64>,
}

impl CleanupFilters {
    pub fn matches(&self, family: &str, name: &str, job_id: u64) -> bool {
        if let Some(f) = &self.model_family {
            if f != family {
                return false;
            }
        }
        if let Some(n) = &self.model_name {
            if n != name {
                return false;
            }
        }
        if let Some(id) = self.job_id {
            if job_id != id {
                return false;
            }
        }
        if let Some(before) = self.before_job_id {
            if job_id >= before {
                return false;
            }
        }
        true
    }
}

/// Outcome of one cleanup pass. Deletion failures are partial: they never
/// abort the remaining matches and are reported here instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Every directory the filters matched, in scan order.
    pub matched: Vec<PathBuf>,
    /// Directories actually removed (empty in a dry run).
    pub removed: Vec<PathBuf>,
    /// Directories that matched but could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    pub dry_run: bool,
}
