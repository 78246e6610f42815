//! Boundary to the backend scheduling driver.
//!
//! The driver handle is owned by exactly one [`DriverSupervisor`](crate::DriverSupervisor);
//! nothing else in the bridge holds a reference to it. Backend callbacks arrive as a
//! stream of [`DriverEvent`]s pulled by that same owner.

mod loopback;
pub use loopback::LoopbackDriver;

#[cfg(test)]
pub(crate) mod scripted;

use std::fmt;

use async_trait::async_trait;
use lx_model::{NodeId, ResourceUnit, Task, TaskId, TaskStatus};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("registering with backend master {master}: {reason}")]
    Registration { master: String, reason: String },
    #[error("backend rejected launch: {0}")]
    Launch(String),
    #[error("driver is not running")]
    NotRunning,
}

/// Session state of the scheduling driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    NotStarted,
    Running,
    /// Stopped on request.
    Stopped,
    /// Session ended by the backend or by an unrecoverable driver error.
    Aborted,
}

impl DriverStatus {
    /// Whether the driver ended (or is still) in an expected state.
    pub fn is_normal(&self) -> bool {
        matches!(self, DriverStatus::Running | DriverStatus::Stopped)
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DriverStatus::NotStarted => "DRIVER_NOT_STARTED",
            DriverStatus::Running => "DRIVER_RUNNING",
            DriverStatus::Stopped => "DRIVER_STOPPED",
            DriverStatus::Aborted => "DRIVER_ABORTED",
        })
    }
}

/// Callback delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// Capacity newly available to this scheduler.
    Offers(Vec<ResourceUnit>),
    StatusUpdate {
        task: TaskId,
        status: TaskStatus,
        message: Option<String>,
    },
    /// Driver-level error; the session may still be alive.
    Error(String),
    /// The session ended with the given status.
    Stopped(DriverStatus),
}

/// Capability the bridge needs from a backend scheduling driver.
#[async_trait]
pub trait SchedulerDriver: Send + 'static {
    fn name(&self) -> &'static str;

    /// Register with the backend. Failure here is fatal for the process.
    async fn start(&mut self) -> Result<(), DriverError>;

    /// Ask the backend to offer held resources to this scheduler again. Best effort.
    async fn revive_offers(&mut self);

    async fn launch(&mut self, node: &NodeId, task: &Task) -> Result<(), DriverError>;

    /// Next backend callback, or `None` once the session is gone.
    ///
    /// Must be cancel safe: it is raced against the dispatch channel.
    async fn next_event(&mut self) -> Option<DriverEvent>;

    async fn stop(&mut self) -> DriverStatus;
}
