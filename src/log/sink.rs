//! The log sink abstraction consumed by the process runner and actions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::run::Severity;

/// Output stream a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// A classified line of output, ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub severity: Severity,
    pub text: String,
}

impl ClassifiedLine {
    /// Create a new classified line.
    #[must_use]
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Destination for classified lines.
///
/// Sinks are shared between concurrent runner invocations, so a single
/// `emit` must never interleave its bytes with another call.
pub trait LogSink: Send + Sync {
    /// Render one line at the given severity.
    fn emit(&self, severity: Severity, text: &str);

    /// Publish a named build parameter for later CI steps.
    fn publish_parameter(&self, name: &str, value: &str) {
        self.emit(Severity::Info, &format!("{name}={value}"));
    }

    fn debug(&self, text: &str) {
        self.emit(Severity::Debug, text);
    }

    fn info(&self, text: &str) {
        self.emit(Severity::Info, text);
    }

    fn warning(&self, text: &str) {
        self.emit(Severity::Warning, text);
    }

    fn error(&self, text: &str) {
        self.emit(Severity::Error, text);
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, severity: Severity, text: &str) {
        (**self).emit(severity, text);
    }

    fn publish_parameter(&self, name: &str, value: &str) {
        (**self).publish_parameter(name, value);
    }
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn LogSink>;
