use lx_model::Task;
use tokio::sync::mpsc;

use crate::error::{CoreError, Rejected};

/// Work handed from matching to the driver supervisor.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCommand {
    ReviveOffers,
    /// Launch a task on the node it carries.
    Launch(Task),
}

/// Create the dispatch channel. The queue side may be cloned freely; the receiver
/// belongs to the single driver supervisor.
pub fn dispatch_channel() -> (DispatchQueue, DispatchReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (DispatchQueue { tx }, DispatchReceiver { rx })
}

#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::UnboundedSender<DriverCommand>,
}

impl DispatchQueue {
    pub fn revive_offers(&self) -> Result<(), CoreError> {
        self.send(DriverCommand::ReviveOffers)
    }

    /// Queue `task` for launch. The task comes back with the error if the driver side is gone.
    pub fn launch(&self, task: Task) -> Result<(), Rejected<CoreError>> {
        match self.tx.send(DriverCommand::Launch(task)) {
            Err(mpsc::error::SendError(DriverCommand::Launch(task))) => {
                Err(Rejected::new(task, CoreError::DispatchClosed))
            }
            _ => Ok(()),
        }
    }

    /// `true` once the driver supervisor stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, cmd: DriverCommand) -> Result<(), CoreError> {
        self.tx.send(cmd).map_err(|_| CoreError::DispatchClosed)
    }
}

pub struct DispatchReceiver {
    rx: mpsc::UnboundedReceiver<DriverCommand>,
}

impl DispatchReceiver {
    /// Next command, or `None` once every queue handle is dropped. Cancel safe.
    pub async fn recv(&mut self) -> Option<DriverCommand> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<DriverCommand> {
        self.rx.try_recv().ok()
    }

    /// Refuse further commands; already queued ones stay readable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
