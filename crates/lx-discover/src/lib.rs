//! Registration of this bridge with the coordinating core service.

mod config;
pub use config::RegisterConfig;

mod errors;
pub use errors::DiscoverError;

mod register;
pub use register::{RegisterRequest, register};
