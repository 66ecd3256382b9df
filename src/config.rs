//! Runtime tuning for the device manager

use serde::{Deserialize, Serialize};

/// Device manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Capacity of the inbound report event channel
    pub input_queue_capacity: usize,
    /// Log inbound reports that match no known signal at warn instead of debug
    pub warn_unmatched_reports: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            input_queue_capacity: 64,
            warn_unmatched_reports: false,
        }
    }
}
