use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle position of a task.
///
/// `Pending` through `Dispatched` are driven by the bridge itself; everything after is
/// whatever the backend last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Admitted and waiting for resources.
    Pending,
    /// Placed on a node and queued for the driver.
    Matched,
    /// Launch call issued to the backend.
    Dispatched,
    /// Backend accepted the task and is preparing it.
    Staging,
    Running,
    Finished,
    Failed,
    Killed,
    /// Backend lost track of the task, or it never reached the backend.
    Lost,
}

impl TaskStatus {
    /// Returns `true` if the backend will not report this task again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Finished | TaskStatus::Failed | TaskStatus::Killed | TaskStatus::Lost
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Matched => "matched",
            TaskStatus::Dispatched => "dispatched",
            TaskStatus::Staging => "staging",
            TaskStatus::Running => "running",
            TaskStatus::Finished => "finished",
            TaskStatus::Failed => "failed",
            TaskStatus::Killed => "killed",
            TaskStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "matched" => Ok(TaskStatus::Matched),
            "dispatched" => Ok(TaskStatus::Dispatched),
            "staging" => Ok(TaskStatus::Staging),
            "running" => Ok(TaskStatus::Running),
            "finished" => Ok(TaskStatus::Finished),
            "failed" => Ok(TaskStatus::Failed),
            "killed" => Ok(TaskStatus::Killed),
            "lost" => Ok(TaskStatus::Lost),
            other => Err(format!("unknown task status: '{other}'")),
        }
    }
}
