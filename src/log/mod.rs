//! Log sinks rendering classified output lines.

mod console;
mod memory;
mod sink;
pub mod teamcity;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use sink::*;
pub use teamcity::TeamCitySink;

use crate::run::Severity;

/// Which sink renders output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// TeamCity service messages when running on an agent, console otherwise.
    #[default]
    Auto,
    Console,
    #[serde(rename = "teamcity")]
    TeamCity,
}

impl SinkKind {
    /// Resolve `Auto` against the current environment.
    #[must_use]
    pub fn resolve(self) -> SinkKind {
        match self {
            Self::Auto if teamcity::running_under_teamcity() => Self::TeamCity,
            Self::Auto => Self::Console,
            other => other,
        }
    }
}

/// Build a stdout sink of the given kind.
#[must_use]
pub fn stdout_sink(kind: SinkKind, min_severity: Severity) -> SharedSink {
    match kind.resolve() {
        SinkKind::TeamCity => Arc::new(TeamCitySink::stdout(min_severity)),
        SinkKind::Console | SinkKind::Auto => Arc::new(ConsoleSink::stdout(min_severity)),
    }
}
