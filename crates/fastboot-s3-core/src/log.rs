//! Pipeline log sink.
//!
//! The host decides how step output is shown. [`TracingLog`] forwards to
//! `tracing`; [`RecordingLog`] keeps lines in memory.

use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, error, info};

/// Color hint for a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogColor {
    /// Host default.
    #[default]
    Default,
    /// Highlighted failure output.
    Red,
}

/// Presentation options for a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogOptions {
    /// Color hint.
    pub color: LogColor,
    /// Only shown when the host runs verbosely.
    pub verbose: bool,
}

impl LogOptions {
    /// Verbose, default-colored line.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            color: LogColor::Default,
            verbose: true,
        }
    }

    /// Red, always-shown line.
    #[must_use]
    pub fn red() -> Self {
        Self {
            color: LogColor::Red,
            verbose: false,
        }
    }
}

/// Where the step writes human-readable progress and failures.
pub trait PipelineLog: Send + Sync + fmt::Debug {
    /// Emit one line.
    fn log(&self, message: &str, options: LogOptions);
}

/// [`PipelineLog`] backed by `tracing`.
///
/// Red lines become `ERROR` events, verbose lines `DEBUG`, the rest `INFO`.
/// Each event carries the plugin name.
#[derive(Debug, Clone)]
pub struct TracingLog {
    plugin: String,
}

impl TracingLog {
    /// Create a sink tagged with `plugin`.
    #[must_use]
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
        }
    }
}

impl PipelineLog for TracingLog {
    fn log(&self, message: &str, options: LogOptions) {
        match options {
            LogOptions {
                color: LogColor::Red,
                ..
            } => error!(plugin = %self.plugin, "{message}"),
            LogOptions { verbose: true, .. } => debug!(plugin = %self.plugin, "{message}"),
            LogOptions { .. } => info!(plugin = %self.plugin, "{message}"),
        }
    }
}

/// [`PipelineLog`] that records every line.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(String, LogOptions)>>,
}

impl RecordingLog {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines in order.
    #[must_use]
    pub fn lines(&self) -> Vec<(String, LogOptions)> {
        self.lines.lock().clone()
    }

    /// Messages logged in red.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(_, options)| options.color == LogColor::Red)
            .map(|(message, _)| message)
            .collect()
    }
}

impl PipelineLog for RecordingLog {
    fn log(&self, message: &str, options: LogOptions) {
        self.lines.lock().push((message.to_owned(), options));
    }
}
