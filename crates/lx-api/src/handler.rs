use async_trait::async_trait;
use lx_model::{LaunchBatch, Task, TaskId, TaskProvider, TaskRecord, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Status answer for a single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusInfo {
    pub status: TaskStatus,
    /// Placement and backend message, once the task left the pending pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TaskRecord>,
}

/// Operations exposed to network-facing workers.
///
/// Implemented by [`BridgeApiAdapter`](crate::BridgeApiAdapter); custom handlers can wrap it
/// to add auth or rate limiting.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Returns `true` if an existing provider was replaced.
    async fn register_provider(&self, provider: TaskProvider) -> Result<bool, ApiError>;

    async fn unregister_provider(&self, id: &str) -> Result<(), ApiError>;

    async fn list_providers(&self) -> Result<Vec<TaskProvider>, ApiError>;

    async fn submit_task(&self, provider_id: &str, task: Task) -> Result<TaskId, ApiError>;

    /// Returns how many tasks were queued for launch.
    async fn launch_tasks(&self, batch: LaunchBatch) -> Result<usize, ApiError>;

    async fn pending_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn task_status(&self, id: &str) -> Result<Option<TaskStatusInfo>, ApiError>;
}
