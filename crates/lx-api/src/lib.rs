mod error;
pub use error::ApiError;

mod handler;
pub use handler::{ApiHandler, TaskStatusInfo};

mod adapter;
pub use adapter::BridgeApiAdapter;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
pub use axum;
