mod errors;
pub use errors::{ErrorReporter, ErrorSupervisor, Failure, error_channel};

use lx_model::{ResourceUnit, Task, TaskStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    dispatch::{DispatchReceiver, DriverCommand},
    driver::{DriverEvent, DriverStatus, SchedulerDriver},
    error::CoreError,
    state::StatusBook,
};

const ORIGIN: &str = "driver";

/// How the driver loop ended.
#[derive(Debug)]
pub struct ShutdownReport {
    pub status: DriverStatus,
    /// Launch calls the backend accepted.
    pub launched: usize,
    /// Tasks still queued when the loop stopped; never handed to the backend.
    pub rejected: Vec<Task>,
}

/// Sole owner of the backend driver.
///
/// Consumes the dispatch channel, issues revive and launch calls, and turns backend
/// callbacks into status records, forwarded offers, and reported failures.
pub struct DriverSupervisor<D> {
    driver: D,
    commands: DispatchReceiver,
    statuses: StatusBook,
    errors: ErrorReporter,
    offers: Option<mpsc::UnboundedSender<Vec<ResourceUnit>>>,
}

impl<D: SchedulerDriver> DriverSupervisor<D> {
    pub fn new(
        driver: D,
        commands: DispatchReceiver,
        statuses: StatusBook,
        errors: ErrorReporter,
    ) -> Self {
        Self {
            driver,
            commands,
            statuses,
            errors,
            offers: None,
        }
    }

    /// Forward every offer batch announced by the backend to `tx`.
    pub fn with_offer_sink(mut self, tx: mpsc::UnboundedSender<Vec<ResourceUnit>>) -> Self {
        self.offers = Some(tx);
        self
    }

    /// Start the driver and serve until cancelled, until every dispatch queue is dropped,
    /// or until the backend ends the session.
    ///
    /// Only a failed start is returned as an error. Runtime stoppages go to the error
    /// supervisor and still produce a [`ShutdownReport`].
    #[instrument(level = "debug", skip_all, fields(driver = self.driver.name()))]
    pub async fn run(self, cancel: CancellationToken) -> Result<ShutdownReport, CoreError> {
        let Self {
            mut driver,
            mut commands,
            statuses,
            errors,
            offers,
        } = self;

        driver.start().await.map_err(CoreError::DriverInitialization)?;
        info!("scheduler driver started");

        let mut launched = 0;
        let status = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("shutdown requested");
                    break driver.stop().await;
                }
                cmd = commands.recv() => match cmd {
                    Some(DriverCommand::ReviveOffers) => driver.revive_offers().await,
                    Some(DriverCommand::Launch(task)) => {
                        if launch(&mut driver, &statuses, &errors, task).await {
                            launched += 1;
                        }
                    }
                    None => {
                        debug!("dispatch channel closed by all producers");
                        break driver.stop().await;
                    }
                },
                event = driver.next_event() => match event {
                    Some(DriverEvent::Offers(units)) => forward_offers(offers.as_ref(), units),
                    Some(DriverEvent::StatusUpdate { task, status, message }) => {
                        trace!(%task, %status, "status update");
                        if !statuses.update(&task, status, message) {
                            debug!(%task, %status, "status update for unknown task");
                        }
                    }
                    Some(DriverEvent::Error(reason)) => {
                        errors.report(
                            ORIGIN,
                            CoreError::DriverRuntime { status: DriverStatus::Running, reason },
                        );
                    }
                    Some(DriverEvent::Stopped(status)) => {
                        if !status.is_normal() {
                            errors.report(
                                ORIGIN,
                                CoreError::DriverRuntime { status, reason: "session ended".into() },
                            );
                        }
                        break status;
                    }
                    None => {
                        let status = DriverStatus::Aborted;
                        errors.report(
                            ORIGIN,
                            CoreError::DriverRuntime { status, reason: "event stream closed".into() },
                        );
                        break status;
                    }
                },
            }
        };

        commands.close();
        let mut rejected = Vec::new();
        while let Some(cmd) = commands.try_recv() {
            if let DriverCommand::Launch(task) = cmd {
                warn!(task = %task.id, "driver stopped before launch; task rejected");
                statuses.record(&task, TaskStatus::Lost, Some("driver stopped before launch".into()));
                rejected.push(task);
            }
        }

        info!(%status, launched, rejected = rejected.len(), "scheduler driver stopped");
        Ok(ShutdownReport {
            status,
            launched,
            rejected,
        })
    }
}

async fn launch<D: SchedulerDriver>(
    driver: &mut D,
    statuses: &StatusBook,
    errors: &ErrorReporter,
    task: Task,
) -> bool {
    let Some(node) = task.node.clone() else {
        warn!(task = %task.id, "task reached the driver without a node");
        statuses.record(&task, TaskStatus::Lost, Some("no node assigned".into()));
        return false;
    };

    statuses.record(&task, TaskStatus::Matched, None);
    match driver.launch(&node, &task).await {
        Ok(()) => {
            debug!(task = %task.id, %node, "task launched");
            statuses.record(&task, TaskStatus::Dispatched, None);
            true
        }
        Err(source) => {
            statuses.record(&task, TaskStatus::Failed, Some(source.to_string()));
            errors.report(
                ORIGIN,
                CoreError::Launch {
                    task: task.id.clone(),
                    node,
                    source,
                },
            );
            false
        }
    }
}

fn forward_offers(sink: Option<&mpsc::UnboundedSender<Vec<ResourceUnit>>>, units: Vec<ResourceUnit>) {
    trace!(units = units.len(), "offers received");
    match sink {
        Some(tx) => {
            if tx.send(units).is_err() {
                debug!("offer sink closed; offers dropped");
            }
        }
        None => debug!(units = units.len(), "no offer sink; offers dropped"),
    }
}
