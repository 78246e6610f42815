mod config;
mod error;
mod format;
mod log;

pub use config::{LoggerConfig, local_offset};
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global subscriber described by `cfg`. Succeeds once per process.
///
/// Timestamps use `cfg.offset`; build the config before starting a multi-threaded
/// runtime or they are written in UTC.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)
}
