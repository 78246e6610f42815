use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lx_model::{NodeId, Task, TaskId};
use tokio::sync::mpsc;

use super::{DriverError, DriverEvent, DriverStatus, SchedulerDriver};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Start,
    Revive,
    Launch(TaskId, NodeId),
    Stop,
}

/// Test driver that records every call and replays injected events.
pub(crate) struct ScriptedDriver {
    calls: Arc<Mutex<Vec<Call>>>,
    events: mpsc::UnboundedReceiver<DriverEvent>,
    fail_start: bool,
    fail_launch: Option<TaskId>,
}

pub(crate) struct ScriptHandle {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub events: mpsc::UnboundedSender<DriverEvent>,
}

impl ScriptHandle {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScriptedDriver {
    pub fn new() -> (Self, ScriptHandle) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            calls: Arc::clone(&calls),
            events: rx,
            fail_start: false,
            fail_launch: None,
        };
        (driver, ScriptHandle { calls, events: tx })
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_launch(mut self, id: &str) -> Self {
        self.fail_launch = Some(TaskId::from(id));
        self
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SchedulerDriver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn start(&mut self) -> Result<(), DriverError> {
        self.push(Call::Start);
        if self.fail_start {
            return Err(DriverError::Registration {
                master: "scripted".into(),
                reason: "refused".into(),
            });
        }
        Ok(())
    }

    async fn revive_offers(&mut self) {
        self.push(Call::Revive);
    }

    async fn launch(&mut self, node: &NodeId, task: &Task) -> Result<(), DriverError> {
        self.push(Call::Launch(task.id.clone(), node.clone()));
        if self.fail_launch.as_ref() == Some(&task.id) {
            return Err(DriverError::Launch("insufficient cpus".into()));
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Option<DriverEvent> {
        self.events.recv().await
    }

    async fn stop(&mut self) -> DriverStatus {
        self.push(Call::Stop);
        DriverStatus::Stopped
    }
}
