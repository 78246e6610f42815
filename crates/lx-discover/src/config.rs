use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RegisterConfig {
    /// Name to register under.
    pub name: String,
    /// `host:port` the coordinator should call back on.
    pub address: String,
    /// Coordinator endpoint, with or without a scheme.
    pub coordinator: String,
    pub timeout: Duration,
}

impl RegisterConfig {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        coordinator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coordinator: coordinator.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Coordinator base URL; plain `host:port` values are taken as `http`.
    pub fn base_url(&self) -> Option<String> {
        let endpoint = self.coordinator.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return None;
        }
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Some(endpoint.to_string())
        } else {
            Some(format!("http://{endpoint}"))
        }
    }
}
