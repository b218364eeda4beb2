//! Child process supervision with real-time classified logging.
//!
//! The runner spawns a command, reads stdout and stderr concurrently as the
//! child writes them, classifies each line and forwards it to the sink. Both
//! streams are drained to the end before the exit code is collected, so a
//! chatty child can never block on a full pipe.
//!
//! There is no timeout: a child that never exits blocks its invocation.

use std::path::PathBuf;
use std::pin::pin;
use std::process::Stdio;

use async_trait::async_trait;
use futures_core::Stream;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_stream::StreamExt;

use crate::log::{LogSink, SharedSink, StreamKind};

use super::{ansi, classify, ClassifierState, DetectionMode, RunError, Severity};

/// Environment variable forcing colored output from CMake and friends.
pub const DEFAULT_COLOR_ENV: &str = "CLICOLOR_FORCE";

/// Anything that can execute a command and report its exit code.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` and return its exit code.
    async fn execute(&self, command: &[String], mode: DetectionMode) -> i32;
}

/// Split a command line on whitespace. No quoting rules apply.
#[must_use]
pub fn tokenize(command: &str) -> Vec<String> {
    command.split_whitespace().map(String::from).collect()
}

/// Spawns commands and logs their output through a sink.
#[derive(Clone)]
pub struct ProcessRunner {
    sink: SharedSink,
    working_dir: Option<PathBuf>,
    color_env: String,
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("working_dir", &self.working_dir)
            .field("color_env", &self.color_env)
            .finish_non_exhaustive()
    }
}

impl ProcessRunner {
    /// Create a runner logging to `sink`.
    #[must_use]
    pub fn new(sink: SharedSink) -> Self {
        Self {
            sink,
            working_dir: None,
            color_env: DEFAULT_COLOR_ENV.to_string(),
        }
    }

    /// Run children in the given directory.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Override the variable set to request colored output.
    #[must_use]
    pub fn color_env(mut self, name: impl Into<String>) -> Self {
        self.color_env = name.into();
        self
    }

    /// Run a command and return its exit code.
    ///
    /// Failures to start or read the child are logged as one error line and
    /// reported as exit code 1. The child's own exit code is returned as is.
    pub async fn run(&self, command: &[String], mode: DetectionMode) -> i32 {
        match self.try_run(command, mode).await {
            Ok(code) => code,
            Err(err) => {
                tracing::debug!(error = ?err, "Command failed to run");
                self.sink.error(&err.to_string());
                1
            }
        }
    }

    /// Tokenize `command` on whitespace and run it.
    pub async fn run_line(&self, command: &str, mode: DetectionMode) -> i32 {
        self.run(&tokenize(command), mode).await
    }

    async fn try_run(&self, command: &[String], mode: DetectionMode) -> Result<i32, RunError> {
        let Some((program, args)) = command.split_first() else {
            return Err(RunError::EmptyCommand);
        };
        let command_line = command.join(" ");
        self.sink.info(&format!("Running command: {command_line}"));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if mode == DetectionMode::ColorMarker {
            cmd.env(&self.color_env, "1");
        }
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %command_line, ?mode, "Spawning process");
        let mut child = cmd
            .spawn()
            .map_err(|err| RunError::from_spawn(command, err))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(RunError::Stream {
                command: command_line,
                source: std::io::Error::other("child output pipes unavailable"),
            });
        };

        let mut lines = pin!(line_stream(stdout, StreamKind::Stdout)
            .merge(line_stream(stderr, StreamKind::Stderr)));
        let mut state = ClassifierState::new();
        let mut forwarded = 0usize;

        while let Some(item) = lines.next().await {
            let (kind, line) = item.map_err(|source| RunError::Stream {
                command: command_line.clone(),
                source,
            })?;
            if line.is_empty() {
                continue;
            }
            self.forward(kind, &line, mode, &mut state);
            forwarded += 1;
        }

        let status = child.wait().await.map_err(|source| RunError::Wait {
            command: command_line.clone(),
            source,
        })?;
        tracing::debug!(command = %command_line, %status, lines = forwarded, "Process finished");

        status.code().ok_or(RunError::Signalled {
            command: command_line,
            status,
        })
    }

    fn forward(
        &self,
        kind: StreamKind,
        line: &str,
        mode: DetectionMode,
        state: &mut ClassifierState,
    ) {
        let mut severity = classify(line, mode, state);
        if kind == StreamKind::Stderr {
            severity = severity.at_least(Severity::Warning);
        }
        if mode.strips_ansi() {
            self.sink.emit(severity, &ansi::strip(line));
        } else {
            self.sink.emit(severity, line);
        }
    }
}

#[async_trait]
impl CommandExecutor for ProcessRunner {
    async fn execute(&self, command: &[String], mode: DetectionMode) -> i32 {
        self.run(command, mode).await
    }
}

/// Turn a child pipe into a stream of decoded lines tagged with their origin.
///
/// Lines are split on `\n`, lose their trailing `\r\n`, and are decoded
/// lossily. The stream ends after the first read error.
fn line_stream<R>(
    reader: R,
    kind: StreamKind,
) -> impl Stream<Item = std::io::Result<(StreamKind, String)>>
where
    R: AsyncRead + Unpin,
{
    futures_util::stream::unfold(Some(BufReader::new(reader)), move |reader| async move {
        let mut reader = reader?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => Some((Ok((kind, decode_line(&buf))), Some(reader))),
            Err(err) => Some((Err(err), None)),
        }
    })
}

fn decode_line(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}
