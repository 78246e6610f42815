use std::io::IsTerminal;

use time::UtcOffset;

use crate::logger::format::LoggerFormat;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `lx_core=debug,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
    /// Offset timestamps are written in.
    pub offset: UtcOffset,
}

impl LoggerConfig {
    /// Default config at `debug` or `info` level.
    pub fn verbose(debug: bool) -> Self {
        Self {
            level: if debug { "debug" } else { "info" }.to_string(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }
}

impl Default for LoggerConfig {
    /// Captures the local offset, so build it before any other thread is spawned.
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
            offset: local_offset(),
        }
    }
}

/// The machine's UTC offset, or UTC when it cannot be determined.
///
/// The `time` crate refuses to read the offset once the process has more than one
/// thread, so this yields UTC when called from inside a multi-threaded runtime.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
