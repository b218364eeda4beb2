//! Human-readable console sink.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::run::Severity;

use super::LogSink;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Renders `<timestamp> [LEVEL] text` lines, colored by severity.
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
    min_severity: Severity,
    colored: bool,
}

impl ConsoleSink {
    /// Console sink writing to stdout.
    #[must_use]
    pub fn stdout(min_severity: Severity) -> Self {
        Self::new(io::stdout(), min_severity, true)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Console sink writing to `out`.
    ///
    /// Lines below `min_severity` are dropped. `colored` adds ANSI colors to
    /// the level tag; pass `false` when `out` is not a terminal.
    #[must_use]
    pub fn new(out: W, min_severity: Severity, colored: bool) -> Self {
        Self {
            out: Mutex::new(out),
            min_severity,
            colored,
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

    fn format(&self, severity: Severity, text: &str) -> String {
        let tag = format!("[{}]", severity.label());
        if !self.colored {
            return format!("{} {tag} {text}", timestamp());
        }
        let tag = match severity {
            Severity::Debug => tag.dimmed().to_string(),
            Severity::Info => tag.blue().bold().to_string(),
            Severity::Warning => tag.yellow().bold().to_string(),
            Severity::Error => tag.red().bold().to_string(),
        };
        let text = match severity {
            Severity::Error => text.red().to_string(),
            Severity::Warning => text.yellow().to_string(),
            Severity::Debug | Severity::Info => text.to_string(),
        };
        format!("{} {tag} {text}", timestamp().dimmed())
    }
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn emit(&self, severity: Severity, text: &str) {
        if severity < self.min_severity {
            return;
        }
        let line = self.format(severity, text);
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
    }
}
