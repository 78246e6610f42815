use std::sync::Arc;

use lx_model::{ProviderId, Task, TaskId};
use tracing::{debug, instrument};

use crate::{
    error::{CoreError, Rejected},
    pool::{PendingTaskPool, TaskProviderPool},
};

/// Admits tasks: resolves their provider, stamps it, queues them as pending.
#[derive(Clone)]
pub struct Submitter {
    providers: Arc<TaskProviderPool>,
    pending: Arc<PendingTaskPool>,
}

impl Submitter {
    pub fn new(providers: Arc<TaskProviderPool>, pending: Arc<PendingTaskPool>) -> Self {
        Self { providers, pending }
    }

    /// Route `task` to the provider registered as `provider_id` and queue it.
    ///
    /// All or nothing: on failure the task comes back inside [`Rejected`] exactly as it
    /// was passed in, and neither pool retains anything.
    #[instrument(level = "debug", skip(self, task), fields(task = %task.id))]
    pub fn submit_task(&self, provider_id: &str, task: Task) -> Result<TaskId, Rejected<CoreError>> {
        let provider = match self.providers.get(provider_id) {
            Ok(provider) => provider,
            Err(source) => {
                let error = CoreError::ProviderNotFound {
                    provider: ProviderId::from(provider_id),
                    source,
                };
                return Err(Rejected::new(task, error));
            }
        };

        let mut task = task;
        let id = task.id.clone();
        let previous = task.provider.replace(provider.id.clone());

        self.pending.add_task(task).map_err(|rejected| {
            let (mut task, source) = rejected.into_parts();
            task.provider = previous;
            Rejected::new(task, CoreError::AdmissionFailed { task: id.clone(), source })
        })?;

        debug!("task admitted");
        Ok(id)
    }
}
