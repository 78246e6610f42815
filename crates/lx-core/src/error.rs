use lx_model::{NodeId, ProviderId, Task, TaskId};
use thiserror::Error;

use crate::driver::{DriverError, DriverStatus};

/// Failures of the in-memory pools.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("task provider not found: {0}")]
    NotFound(ProviderId),
    #[error("task already pending: {0}")]
    Duplicate(TaskId),
    #[error("invalid task state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("getting task provider from pool {provider}: {source}")]
    ProviderNotFound {
        provider: ProviderId,
        #[source]
        source: PoolError,
    },
    #[error("adding task {task} to pending task pool: {source}")]
    AdmissionFailed {
        task: TaskId,
        #[source]
        source: PoolError,
    },
    #[error("need at least one resource to launch a task")]
    InsufficientResources,
    #[error("dispatch channel is closed")]
    DispatchClosed,
    #[error("initializing scheduler driver: {0}")]
    DriverInitialization(#[source] DriverError),
    #[error("scheduler driver stopped with status {status}: {reason}")]
    DriverRuntime { status: DriverStatus, reason: String },
    #[error("launching task {task} on node {node}: {source}")]
    Launch {
        task: TaskId,
        node: NodeId,
        #[source]
        source: DriverError,
    },
}

impl CoreError {
    /// The pool-level cause, for errors that wrap one.
    pub fn pool_error(&self) -> Option<&PoolError> {
        match self {
            CoreError::ProviderNotFound { source, .. } | CoreError::AdmissionFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// A task handed back to the caller together with the reason it was not accepted.
///
/// The task is returned exactly as the caller passed it in.
#[derive(Debug, Error)]
#[error("task {} rejected: {error}", .task.id)]
pub struct Rejected<E> {
    task: Box<Task>,
    #[source]
    error: E,
}

impl<E> Rejected<E> {
    pub fn new(task: Task, error: E) -> Self {
        Self {
            task: Box::new(task),
            error,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn into_task(self) -> Task {
        *self.task
    }

    pub fn into_parts(self) -> (Task, E) {
        (*self.task, self.error)
    }
}

/// A launch call that stopped before every task reached the dispatch channel.
///
/// Unsent tasks that came out of the pending pool are put back there with their
/// placement cleared. Tasks the pool could not take back are returned in `unsent`.
#[derive(Debug, Error)]
#[error("{error} ({launched} queued, {requeued} back to pending, {} handed back)", .unsent.len())]
pub struct LaunchFailure {
    #[source]
    error: CoreError,
    launched: usize,
    requeued: usize,
    unsent: Vec<Task>,
}

impl LaunchFailure {
    pub fn new(error: CoreError, launched: usize, requeued: usize, unsent: Vec<Task>) -> Self {
        Self {
            error,
            launched,
            requeued,
            unsent,
        }
    }

    pub fn error(&self) -> &CoreError {
        &self.error
    }

    /// Tasks queued for the driver before the failure, taken from the front of the batch.
    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Unsent tasks readmitted to the pending pool.
    pub fn requeued(&self) -> usize {
        self.requeued
    }

    pub fn unsent(&self) -> &[Task] {
        &self.unsent
    }

    pub fn into_error(self) -> CoreError {
        self.error
    }

    pub fn into_unsent(self) -> Vec<Task> {
        self.unsent
    }
}
