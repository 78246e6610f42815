use serde::{Deserialize, Serialize};

use crate::ProviderId;

/// A registered backend capable of accepting tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProvider {
    pub id: ProviderId,
    /// Where the provider can be reached (address or connection string).
    #[serde(default)]
    pub source: String,
}

impl TaskProvider {
    pub fn new(id: impl Into<ProviderId>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}
