//! In-memory sink that records every emission.

use std::sync::Mutex;

use crate::run::Severity;

use super::{ClassifiedLine, LogSink};

/// Records classified lines and published parameters.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<ClassifiedLine>>,
    parameters: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines in emission order.
    #[must_use]
    pub fn lines(&self) -> Vec<ClassifiedLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Recorded lines at exactly the given severity.
    #[must_use]
    pub fn at(&self, severity: Severity) -> Vec<ClassifiedLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.severity == severity)
            .collect()
    }

    /// Texts of all recorded lines.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|line| line.text).collect()
    }

    /// Parameters published so far, in order.
    #[must_use]
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.parameters
            .lock()
            .map(|params| params.clone())
            .unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, severity: Severity, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(ClassifiedLine::new(severity, text));
        }
    }

    fn publish_parameter(&self, name: &str, value: &str) {
        if let Ok(mut params) = self.parameters.lock() {
            params.push((name.to_string(), value.to_string()));
        }
    }
}
