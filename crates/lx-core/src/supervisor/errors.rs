use std::error::Error as StdError;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

type BoxError = Box<dyn StdError + Send + Sync>;

/// An asynchronous failure and the worker it came from.
#[derive(Debug)]
pub struct Failure {
    origin: &'static str,
    error: BoxError,
}

impl Failure {
    pub fn new(origin: &'static str, error: impl Into<BoxError>) -> Self {
        Self {
            origin,
            error: error.into(),
        }
    }

    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

pub fn error_channel() -> (ErrorReporter, ErrorSupervisor) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorReporter { tx }, ErrorSupervisor { rx })
}

/// Cloneable sending side of the error supervisor.
#[derive(Clone)]
pub struct ErrorReporter {
    tx: mpsc::UnboundedSender<Failure>,
}

impl ErrorReporter {
    /// Hand a failure to the supervisor. If the supervisor is gone it is logged here instead.
    pub fn report(&self, origin: &'static str, error: impl Into<BoxError>) {
        if let Err(mpsc::error::SendError(failure)) = self.tx.send(Failure::new(origin, error)) {
            log_failure(&failure);
        }
    }
}

/// Single draining point for failures of the long-running workers.
///
/// Every failure is logged and the loop moves on; restart decisions are left to
/// whoever supervises the process.
pub struct ErrorSupervisor {
    rx: mpsc::UnboundedReceiver<Failure>,
}

impl ErrorSupervisor {
    /// Drain failures until every reporter is dropped or `cancel` fires.
    /// Failures already queued at cancellation are still logged.
    /// Returns how many were handled.
    pub async fn run(mut self, cancel: CancellationToken) -> usize {
        let mut handled = 0;
        loop {
            tokio::select! {
                biased;
                failure = self.rx.recv() => match failure {
                    Some(failure) => {
                        log_failure(&failure);
                        handled += 1;
                    }
                    None => break,
                },
                _ = cancel.cancelled() => {
                    self.rx.close();
                    while let Ok(failure) = self.rx.try_recv() {
                        log_failure(&failure);
                        handled += 1;
                    }
                    break;
                }
            }
        }
        debug!(handled, "error supervisor stopped");
        handled
    }
}

fn log_failure(failure: &Failure) {
    error!(origin = failure.origin, error = %failure.error, "LayerX Mesos RPI Failed!");
}
