//! Logging collaborator for storage diagnostics.
//!
//! The engine does not depend on any process-wide logger singleton. Instead,
//! containers that emit diagnostics hold an injected [`Logger`] capability
//! (defaulting to [`NoopLogger`]). Three implementations are provided:
//!
//! - [`NoopLogger`] — discards everything; the default.
//! - [`StderrLogger`] — plain console output for quick debugging.
//! - [`TracingLogger`] — forwards to the [`tracing`] facade so hosts keep
//!   their usual subscriber setup.
//!
//! ## Contract
//! Implementations must never panic and must not block materially; the
//! engine calls them from hot structural paths (bucket splits, merges,
//! dense growth) and assumes they are cheap.

use std::fmt;
use std::panic::Location;


/// Ordered diagnostic severities.
///
/// `Trace < Debug < Info < Warn < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Fine-grained structural events (bucket create/destroy).
    Trace,
    /// Structural changes of note (split, merge, rebalance, growth).
    Debug,
    /// General informational messages.
    Info,
    /// Suspicious but recoverable conditions.
    Warn,
    /// Operation-level failures.
    Error,
    /// Unrecoverable conditions; the host should terminate.
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        };
        f.write_str(name)
    }
}

/// Call-site information attached to every log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file of the call.
    pub file: &'static str,
    /// Line within the file.
    pub line: u32,
}

impl CallSite {
    /// Captures the caller's location.
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self { file: location.file(), line: location.line() }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Injected logging capability.
///
/// Implementations must never panic and must not block materially.
pub trait Logger {
    /// Records one diagnostic message at the given severity.
    fn log(&self, level: LogLevel, message: &str, site: CallSite);
}

/// Logger that discards every record. The default capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str, _site: CallSite) {}
}

/// Logger that writes `[LEVEL][file:line] - message` lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn log(&self, level: LogLevel, message: &str, site: CallSite) {
        eprintln!("[{level}][{site}] - {message}");
    }
}

/// Logger that forwards records to the [`tracing`] facade.
///
/// `tracing` has no `Fatal` level; fatal records are emitted as errors with
/// a `fatal = true` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, site: CallSite) {
        match level {
            LogLevel::Trace => {
                tracing::trace!(file = site.file, line = site.line, "{message}")
            }
            LogLevel::Debug => {
                tracing::debug!(file = site.file, line = site.line, "{message}")
            }
            LogLevel::Info => {
                tracing::info!(file = site.file, line = site.line, "{message}")
            }
            LogLevel::Warn => {
                tracing::warn!(file = site.file, line = site.line, "{message}")
            }
            LogLevel::Error => {
                tracing::error!(file = site.file, line = site.line, "{message}")
            }
            LogLevel::Fatal => {
                tracing::error!(file = site.file, line = site.line, fatal = true, "{message}")
            }
        }
    }
}
