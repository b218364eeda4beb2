//! Severity classification for subprocess output lines.
//!
//! Each invocation of the process runner owns one [`ClassifierState`] and
//! threads it through every call to [`classify`]. Only
//! [`DetectionMode::ColorMarker`] reads or writes the state.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

static ZERO_FAILURES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b0\s+(tests?|errors?)\s+(failed|error)").expect("valid regex")
});

static ERROR_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(error|failed|fatal|exception)\b").expect("valid regex")
});

static WARNING_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(warning|warn|deprecated)\b").expect("valid regex"));

static NINJA_PROGRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\d+/\d+\]").expect("valid regex"));

/// Severity of a classified output line.
///
/// Ordered so that `max` picks the more severe of two levels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Raise this severity to at least `floor`.
    #[must_use]
    pub fn at_least(self, floor: Severity) -> Severity {
        self.max(floor)
    }

    /// Upper-case label used by the log sinks.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strategy used to derive a severity from a line of tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Keyword search over the line text.
    #[default]
    ContentHeuristic,
    /// ANSI color codes open and close severity blocks.
    ColorMarker,
    /// Ninja progress lines are info, everything else is an error.
    NinjaProgress,
}

impl DetectionMode {
    /// Whether lines should have ANSI sequences removed before they are logged.
    #[must_use]
    pub fn strips_ansi(self) -> bool {
        matches!(self, Self::ColorMarker)
    }
}

/// Severity carried between consecutive lines of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierState {
    /// Severity assigned to the line classified last.
    pub current_severity: Severity,
    /// Severity the next line starts from.
    pub pending_severity: Severity,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self {
            current_severity: Severity::Info,
            pending_severity: Severity::Info,
        }
    }
}

impl ClassifierState {
    /// Create a fresh state with both severities at `Info`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Classify a single non-empty line of output.
pub fn classify(line: &str, mode: DetectionMode, state: &mut ClassifierState) -> Severity {
    match mode {
        DetectionMode::ContentHeuristic => classify_content(line),
        DetectionMode::ColorMarker => classify_color(line, state),
        DetectionMode::NinjaProgress => classify_ninja(line),
    }
}

fn classify_content(line: &str) -> Severity {
    if ZERO_FAILURES.is_match(line) {
        Severity::Info
    } else if ERROR_KEYWORDS.is_match(line) {
        Severity::Error
    } else if WARNING_KEYWORDS.is_match(line) {
        Severity::Warning
    } else {
        Severity::Info
    }
}

fn classify_color(line: &str, state: &mut ClassifierState) -> Severity {
    let mut current = state.pending_severity;
    if line.contains(RED) {
        current = Severity::Error;
        state.pending_severity = Severity::Error;
    } else if line.contains(YELLOW) {
        current = Severity::Warning;
        state.pending_severity = Severity::Warning;
    }
    // The reset only affects the following line.
    if line.contains(RESET) {
        state.pending_severity = Severity::Info;
    }
    state.current_severity = current;
    current
}

fn classify_ninja(line: &str) -> Severity {
    if NINJA_PROGRESS.is_match(line) {
        Severity::Info
    } else {
        Severity::Error
    }
}
