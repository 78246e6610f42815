use serde::{Deserialize, Serialize};

use crate::{Labels, NodeId, ProviderId, Resources, TaskEnv, TaskId};

/// What to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Command line handed to the backend executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "TaskEnv::is_empty")]
    pub env: TaskEnv,
    /// Container image, if the task runs containerised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A unit of work on its way from a submitter to a compute node.
///
/// `provider` is stamped at submission and must be set before the task can be queued.
/// `node` stays empty until the dispatcher places the task on a resource unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spec: TaskSpec,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            spec: TaskSpec::default(),
            resources: Resources::default(),
            labels: Labels::new(),
            provider: None,
            node: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.spec.command = Some(command.into());
        self
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}
