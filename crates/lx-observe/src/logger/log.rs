use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

/// Build the filter and output layer for `cfg` and install them globally.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = filter(&cfg.level)?;
    let registry = tracing_subscriber::registry().with(filter);
    let timer = OffsetTime::new(cfg.offset, Rfc3339);
    let installed = match cfg.format {
        LoggerFormat::Text => registry
            .with(
                fmt::layer()
                    .with_ansi(cfg.use_color)
                    .with_target(cfg.with_targets)
                    .with_timer(timer),
            )
            .try_init(),
        LoggerFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_ansi(false)
                    .with_target(cfg.with_targets)
                    .with_timer(timer),
            )
            .try_init(),
        LoggerFormat::Journald => registry.with(journald()?).try_init(),
    };
    installed.map_err(|e| {
        let msg = e.to_string();
        // tracing reports a taken global slot only through its message.
        if msg.contains("global default") {
            LoggerError::AlreadyInitialized
        } else {
            LoggerError::InitializationFailed(msg)
        }
    })
}

fn filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|source| LoggerError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald() -> Result<tracing_journald::Layer, LoggerError> {
    tracing_journald::layer().map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))
}

/// Never constructed; stands in for the journald layer in builds without it.
#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald() -> Result<tracing_subscriber::layer::Identity, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger_init;

    #[test]
    fn bad_filter_is_reported() {
        let err = filter("lx_core=loudest").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidFilter { ref directive, .. } if directive == "lx_core=loudest"));
    }

    #[test]
    fn second_init_is_already_initialized() {
        let cfg = LoggerConfig::default();
        // Another test may have installed a subscriber first; only the second call is asserted.
        let _ = logger_init(&cfg);
        assert!(matches!(logger_init(&cfg), Err(LoggerError::AlreadyInitialized)));
    }
}
