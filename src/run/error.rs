//! Process runner error types.

use std::process::ExitStatus;

/// Failures while supervising a child process.
///
/// These never reach callers of the runner: each one is logged as a single
/// error line and turned into exit code 1.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// No executable was given.
    #[error("Cannot run an empty command")]
    EmptyCommand,

    /// The executable could not be resolved.
    #[error("Command not found: {0}. Make sure it's installed and in PATH.")]
    NotFound(String),

    /// Spawning failed for another reason.
    #[error("Error running command '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Reading stdout or stderr failed.
    #[error("Error reading output of '{command}': {source}")]
    Stream {
        command: String,
        source: std::io::Error,
    },

    /// Waiting for the child to exit failed.
    #[error("Error waiting for '{command}': {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },

    /// The child exited without an exit code.
    #[error("Command '{command}' terminated without an exit code ({status})")]
    Signalled { command: String, status: ExitStatus },
}

impl RunError {
    /// Classify a spawn failure, separating a missing executable from the rest.
    pub(crate) fn from_spawn(command: &[String], err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(command[0].clone()),
            _ => Self::Spawn {
                command: command.join(" "),
                source: err,
            },
        }
    }
}
