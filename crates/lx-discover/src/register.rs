use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{config::RegisterConfig, errors::DiscoverError};

const REGISTER_PATH: &str = "/v1/rpis";

/// Body of the registration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub address: String,
    /// Hostname of the machine running the bridge.
    pub host: String,
}

impl RegisterRequest {
    fn from_config(cfg: &RegisterConfig) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());
        Self {
            name: cfg.name.clone(),
            address: cfg.address.clone(),
            host,
        }
    }
}

/// Announce this bridge's address to the coordinator.
pub async fn register(cfg: &RegisterConfig) -> Result<(), DiscoverError> {
    let base = cfg.base_url().ok_or(DiscoverError::MissingEndpoint)?;
    let url = format!("{base}{REGISTER_PATH}");
    let request = RegisterRequest::from_config(cfg);
    debug!(%url, name = %request.name, address = %request.address, "sending registration");

    let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
    let response = client.post(&url).json(&request).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DiscoverError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    info!(coordinator = %base, "registered with coordinator");
    Ok(())
}
