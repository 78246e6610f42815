use serde::{Deserialize, Serialize};

use crate::{NodeId, Resources, Task};

/// Capacity the backend currently offers on one node.
///
/// Only valid for the offer cycle it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUnit {
    pub node_id: NodeId,
    /// Backend offer identifier, when the backend supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub resources: Resources,
}

impl ResourceUnit {
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            offer_id: None,
            resources: Resources::default(),
        }
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }
}

/// Resources to place on, paired with the tasks awaiting placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchBatch {
    #[serde(default)]
    pub resources: Vec<ResourceUnit>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl LaunchBatch {
    pub fn new(resources: Vec<ResourceUnit>, tasks: Vec<Task>) -> Self {
        Self { resources, tasks }
    }
}
