use thiserror::Error;
use tracing_subscriber::filter::ParseError;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}', use text, json or journald")]
    InvalidFormat(String),
    #[error("journald output needs Linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("installing tracing subscriber: {0}")]
    InitializationFailed(String),
    #[error("bad log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },
}
