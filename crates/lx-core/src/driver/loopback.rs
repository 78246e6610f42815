use async_trait::async_trait;
use lx_model::{FrameworkInfo, NodeId, ResourceUnit, Resources, Task, TaskStatus};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{DriverError, DriverEvent, DriverStatus, SchedulerDriver};

/// In-process backend that treats a fixed list of nodes as the whole cluster.
///
/// Every registration or revive announces one offer per node; every launch on a known
/// node is reported back as running.
pub struct LoopbackDriver {
    framework: FrameworkInfo,
    master: String,
    nodes: Vec<NodeId>,
    capacity: Resources,
    status: DriverStatus,
    next_offer: u64,
    events_tx: Option<mpsc::UnboundedSender<DriverEvent>>,
    events_rx: mpsc::UnboundedReceiver<DriverEvent>,
}

impl LoopbackDriver {
    pub fn new(framework: FrameworkInfo, master: impl Into<String>, nodes: Vec<NodeId>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            framework,
            master: master.into(),
            nodes,
            capacity: Resources::new(1.0, 1024, 10_240),
            status: DriverStatus::NotStarted,
            next_offer: 0,
            events_tx: Some(tx),
            events_rx: rx,
        }
    }

    /// Resources announced for each node.
    pub fn with_capacity(mut self, capacity: Resources) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    fn emit(&self, event: DriverEvent) {
        if let Some(tx) = &self.events_tx {
            // Receiver lives in `self`.
            let _ = tx.send(event);
        }
    }

    fn announce_offers(&mut self) {
        let mut units = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            self.next_offer += 1;
            let mut unit = ResourceUnit::new(node.clone()).with_resources(self.capacity);
            unit.offer_id = Some(format!("{}-O{}", self.master, self.next_offer));
            units.push(unit);
        }
        self.emit(DriverEvent::Offers(units));
    }
}

#[async_trait]
impl SchedulerDriver for LoopbackDriver {
    fn name(&self) -> &'static str {
        "loopback"
    }

    async fn start(&mut self) -> Result<(), DriverError> {
        if self.nodes.is_empty() {
            return Err(DriverError::Registration {
                master: self.master.clone(),
                reason: "no nodes to offer".into(),
            });
        }
        if self.status != DriverStatus::NotStarted {
            return Err(DriverError::Registration {
                master: self.master.clone(),
                reason: format!("driver already {}", self.status),
            });
        }

        self.status = DriverStatus::Running;
        info!(
            framework = %self.framework.name,
            user = %self.framework.user,
            master = %self.master,
            nodes = self.nodes.len(),
            "framework registered"
        );
        self.announce_offers();
        Ok(())
    }

    async fn revive_offers(&mut self) {
        if self.status == DriverStatus::Running {
            debug!("reviving offers");
            self.announce_offers();
        }
    }

    async fn launch(&mut self, node: &NodeId, task: &Task) -> Result<(), DriverError> {
        if self.status != DriverStatus::Running {
            return Err(DriverError::NotRunning);
        }
        if !self.nodes.contains(node) {
            return Err(DriverError::Launch(format!("unknown node {node}")));
        }

        self.emit(DriverEvent::StatusUpdate {
            task: task.id.clone(),
            status: TaskStatus::Running,
            message: None,
        });
        Ok(())
    }

    async fn next_event(&mut self) -> Option<DriverEvent> {
        self.events_rx.recv().await
    }

    async fn stop(&mut self) -> DriverStatus {
        if self.status == DriverStatus::Running {
            self.status = DriverStatus::Stopped;
            self.emit(DriverEvent::Stopped(DriverStatus::Stopped));
        }
        self.events_tx = None;
        self.status
    }
}
