use serde::{Deserialize, Serialize};

/// Name this scheduler registers under with the backend master.
pub const FRAMEWORK_NAME: &str = "Layer-X Mesos RPI Framework";

/// Identity handed to the backend when the scheduling driver registers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkInfo {
    /// Backend user tasks execute as.
    pub user: String,
    pub name: String,
    /// Shown by the backend UI as the framework's home.
    pub webui_url: String,
    /// Seconds the backend keeps tasks alive after this scheduler disconnects.
    pub failover_timeout: f64,
}

impl FrameworkInfo {
    pub fn new(coordinator_url: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: FRAMEWORK_NAME.to_string(),
            webui_url: coordinator_url.into(),
            failover_timeout: 0.0,
        }
    }
}
