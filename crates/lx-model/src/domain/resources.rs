use serde::{Deserialize, Serialize};

/// Scalar compute resources, either requested by a task or exposed by a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default)]
    pub cpus: f64,
    #[serde(default)]
    pub mem_mb: u64,
    #[serde(default)]
    pub disk_mb: u64,
}

impl Resources {
    pub fn new(cpus: f64, mem_mb: u64, disk_mb: u64) -> Self {
        Self {
            cpus,
            mem_mb,
            disk_mb,
        }
    }
}
