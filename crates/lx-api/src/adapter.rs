use async_trait::async_trait;
use lx_core::BridgeApi;
use lx_model::{LaunchBatch, Task, TaskId, TaskProvider};
use tracing::debug;

use crate::{
    error::ApiError,
    handler::{ApiHandler, TaskStatusInfo},
};

/// [`ApiHandler`] that delegates straight to a [`BridgeApi`].
pub struct BridgeApiAdapter {
    bridge: BridgeApi,
}

impl BridgeApiAdapter {
    pub fn new(bridge: BridgeApi) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl ApiHandler for BridgeApiAdapter {
    async fn register_provider(&self, provider: TaskProvider) -> Result<bool, ApiError> {
        if provider.id.is_empty() {
            return Err(ApiError::InvalidRequest("provider id cannot be empty".into()));
        }
        Ok(self.bridge.register_provider(provider).is_some())
    }

    async fn unregister_provider(&self, id: &str) -> Result<(), ApiError> {
        self.bridge.unregister_provider(id)?;
        Ok(())
    }

    async fn list_providers(&self) -> Result<Vec<TaskProvider>, ApiError> {
        Ok(self
            .bridge
            .providers()
            .iter()
            .map(|p| p.as_ref().clone())
            .collect())
    }

    async fn submit_task(&self, provider_id: &str, mut task: Task) -> Result<TaskId, ApiError> {
        if task.id.is_empty() {
            task.id = TaskId::generate();
        }
        if task.name.is_empty() {
            task.name = task.id.to_string();
        }
        Ok(self.bridge.submit_task(provider_id, task)?)
    }

    async fn launch_tasks(&self, batch: LaunchBatch) -> Result<usize, ApiError> {
        self.bridge.launch_tasks(batch).map_err(|failure| {
            for task in failure.unsent() {
                debug!(task = %task.id, "task not launched");
            }
            ApiError::from(failure)
        })
    }

    async fn pending_tasks(&self) -> Result<Vec<Task>, ApiError> {
        Ok(self.bridge.pending_tasks())
    }

    async fn task_status(&self, id: &str) -> Result<Option<TaskStatusInfo>, ApiError> {
        Ok(self.bridge.status(id).map(|status| TaskStatusInfo {
            status,
            record: self.bridge.record(id),
        }))
    }
}
