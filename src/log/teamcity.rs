//! TeamCity service-message sink.
//!
//! Lines are rendered as `##teamcity[message ...]` so the build log shows
//! warnings and errors with their proper status.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::run::Severity;

use super::LogSink;

/// Environment variable TeamCity sets on its build agents.
pub const TEAMCITY_ENV: &str = "TEAMCITY_VERSION";

/// Whether the current process runs under a TeamCity agent.
#[must_use]
pub fn running_under_teamcity() -> bool {
    std::env::var_os(TEAMCITY_ENV).is_some()
}

/// Escape a value for use inside a service message attribute.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' => escaped.push_str("||"),
            '\'' => escaped.push_str("|'"),
            '\n' => escaped.push_str("|n"),
            '\r' => escaped.push_str("|r"),
            '[' => escaped.push_str("|["),
            ']' => escaped.push_str("|]"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Format a `message` service message for one line.
#[must_use]
pub fn format_message(severity: Severity, text: &str) -> String {
    let text = escape(text);
    match severity {
        Severity::Error => format!("##teamcity[message text='{text}' status='ERROR']"),
        Severity::Warning => format!("##teamcity[message text='{text}' status='WARNING']"),
        Severity::Debug | Severity::Info => format!("##teamcity[message text='{text}']"),
    }
}

/// Format a `setParameter` service message.
#[must_use]
pub fn format_parameter(name: &str, value: &str) -> String {
    format!(
        "##teamcity[setParameter name='{}' value='{}']",
        escape(name),
        escape(value)
    )
}

/// Sink emitting TeamCity service messages.
#[derive(Debug)]
pub struct TeamCitySink<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
    min_severity: Severity,
}

impl TeamCitySink {
    /// TeamCity sink writing to stdout.
    #[must_use]
    pub fn stdout(min_severity: Severity) -> Self {
        Self::new(io::stdout(), min_severity)
    }
}

impl<W: Write + Send> TeamCitySink<W> {
    /// TeamCity sink writing service messages to `out`.
    ///
    /// Lines below `min_severity` are dropped; parameters are always written.
    #[must_use]
    pub fn new(out: W, min_severity: Severity) -> Self {
        Self {
            out: Mutex::new(out),
            min_severity,
        }
    }

    /// Consume the sink and return the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
    }
}

impl<W: Write + Send> LogSink for TeamCitySink<W> {
    fn emit(&self, severity: Severity, text: &str) {
        if severity < self.min_severity {
            return;
        }
        self.write_line(&format_message(severity, text));
    }

    fn publish_parameter(&self, name: &str, value: &str) {
        self.write_line(&format_parameter(name, value));
    }
}
