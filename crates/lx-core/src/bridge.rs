use std::sync::Arc;

use lx_model::{LaunchBatch, ResourceUnit, Task, TaskId, TaskProvider, TaskRecord, TaskStatus};

use crate::{
    dispatch::{DispatchQueue, Dispatcher},
    error::{CoreError, LaunchFailure, PoolError, Rejected},
    pool::{PendingTaskPool, TaskProviderPool},
    state::StatusView,
    submit::Submitter,
};

/// Everything a request handler may do to the bridge.
///
/// Cheap to clone. Holds no reference to the driver; launches only reach it
/// through the dispatch queue.
#[derive(Clone)]
pub struct BridgeApi {
    providers: Arc<TaskProviderPool>,
    pending: Arc<PendingTaskPool>,
    submitter: Submitter,
    dispatcher: Dispatcher,
    statuses: StatusView,
}

impl BridgeApi {
    pub fn new(
        providers: Arc<TaskProviderPool>,
        pending: Arc<PendingTaskPool>,
        queue: DispatchQueue,
        statuses: StatusView,
    ) -> Self {
        Self {
            submitter: Submitter::new(Arc::clone(&providers), Arc::clone(&pending)),
            dispatcher: Dispatcher::new(queue, Arc::clone(&pending)),
            providers,
            pending,
            statuses,
        }
    }

    pub fn register_provider(&self, provider: TaskProvider) -> Option<Arc<TaskProvider>> {
        self.providers.register(provider)
    }

    pub fn unregister_provider(&self, id: &str) -> Result<Arc<TaskProvider>, PoolError> {
        self.providers.unregister(id)
    }

    pub fn providers(&self) -> Vec<Arc<TaskProvider>> {
        self.providers.list()
    }

    pub fn submit_task(&self, provider_id: &str, task: Task) -> Result<TaskId, Rejected<CoreError>> {
        self.submitter.submit_task(provider_id, task)
    }

    pub fn launch_tasks(&self, batch: LaunchBatch) -> Result<usize, LaunchFailure> {
        self.dispatcher.launch_tasks(batch)
    }

    pub fn on_offers(&self, units: Vec<ResourceUnit>) -> Result<usize, LaunchFailure> {
        self.dispatcher.on_offers(units)
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.pending.list()
    }

    /// `Pending` while the task waits in the pool, otherwise the last recorded status.
    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        if self.pending.contains(id) {
            return Some(TaskStatus::Pending);
        }
        self.statuses.status(id)
    }

    pub fn record(&self, id: &str) -> Option<TaskRecord> {
        self.statuses.get(id)
    }
}
