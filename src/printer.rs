//! Pluggable output for rejected operations and debug summaries.

use std::fmt;

/// Severity of a printed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Sink for store log output.
pub trait Printer {
    fn print(&self, level: LogLevel, message: &str);
}

/// Forwards to `tracing` under the `selection_store` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPrinter;

impl Printer for TracingPrinter {
    fn print(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "selection_store", "{}", message),
            LogLevel::Info => tracing::info!(target: "selection_store", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "selection_store", "{}", message),
            LogLevel::Error => tracing::error!(target: "selection_store", "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(LogLevel::Debug < LogLevel::Warn);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_tracing_printer_without_subscriber() {
        // No subscriber installed: must be a silent no-op.
        TracingPrinter.print(LogLevel::Error, "nothing listens");
    }
}
