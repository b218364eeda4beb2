//! CI actions dispatched by name for a preset.
//!
//! Every action returns the exit code of the first failing step, or 0.

mod build;
mod clean;
mod deploy;
mod docker_image;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CiConfig;
use crate::log::{LogSink, SharedSink};
use crate::run::{CommandExecutor, DetectionMode, ProcessRunner};

pub use build::build;
pub use clean::clean;
pub use deploy::deploy;
pub use docker_image::define_docker_image;
pub use test::test;

/// A named CI action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Action {
    Build,
    Test,
    Deploy,
    Clean,
    DefineDockerImage,
}

impl Action {
    /// Name used on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::Deploy => "deploy",
            Self::Clean => "clean",
            Self::DefineDockerImage => "define-docker-image",
        }
    }

    /// Run the action for `preset`.
    pub async fn run(self, ctx: &ActionContext, preset: &str) -> i32 {
        tracing::debug!(action = self.name(), preset, "Dispatching action");
        match self {
            Self::Build => build(ctx, preset).await,
            Self::Test => test(ctx, preset).await,
            Self::Deploy => deploy(ctx, preset).await,
            Self::Clean => clean(ctx, preset).await,
            Self::DefineDockerImage => define_docker_image(ctx, preset).await,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything an action needs: where the project lives, how to run tools
/// and where to log.
#[derive(Clone)]
pub struct ActionContext {
    pub root: PathBuf,
    pub config: CiConfig,
    pub sink: SharedSink,
    pub executor: Arc<dyn CommandExecutor>,
    /// Host operating system, as in `std::env::consts::OS`.
    pub host_os: String,
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("host_os", &self.host_os)
            .finish_non_exhaustive()
    }
}

impl ActionContext {
    /// Context running real processes through a [`ProcessRunner`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: CiConfig, sink: SharedSink) -> Self {
        let root = root.into();
        let runner = ProcessRunner::new(sink.clone())
            .working_dir(root.clone())
            .color_env(config.color_env.clone());
        Self::with_executor(root, config, sink, Arc::new(runner))
    }

    /// Context with a custom executor.
    #[must_use]
    pub fn with_executor(
        root: impl Into<PathBuf>,
        config: CiConfig,
        sink: SharedSink,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            sink,
            executor,
            host_os: std::env::consts::OS.to_string(),
        }
    }

    /// Build directory of `preset`.
    #[must_use]
    pub fn build_dir(&self, preset: &str) -> PathBuf {
        crate::preset::build_dir(&self.root, &self.config.output_dir, preset)
    }

    async fn execute(&self, command: Vec<String>, mode: DetectionMode) -> i32 {
        self.executor.execute(&command, mode).await
    }

    /// `cmake --preset <preset> -S <root> -G <generator>`.
    fn configure_command(&self, preset: &str) -> Vec<String> {
        vec![
            "cmake".to_string(),
            "--preset".to_string(),
            preset.to_string(),
            "-S".to_string(),
            self.root.display().to_string(),
            "-G".to_string(),
            self.config.generator.clone(),
        ]
    }

    /// Run the configure step, then the build step for `target`.
    async fn configure_and_build(&self, preset: &str, target: Option<&str>) -> i32 {
        let configure = self
            .execute(self.configure_command(preset), DetectionMode::ColorMarker)
            .await;
        if configure != 0 {
            self.sink.error("CMake configuration failed.");
            return configure;
        }
        let build_dir = self.build_dir(preset);
        if !self.require_build_dir(&build_dir) {
            return 1;
        }
        let result = self
            .execute(build_command(&build_dir, target), DetectionMode::NinjaProgress)
            .await;
        if result != 0 {
            self.sink.error("CMake build failed.");
            return result;
        }
        0
    }

    fn require_build_dir(&self, build_dir: &Path) -> bool {
        if build_dir.exists() {
            true
        } else {
            self.sink.error(&format!(
                "Build directory does not exist: {}",
                build_dir.display()
            ));
            false
        }
    }

    /// Remove a build directory, ignoring failures. Returns whether it existed.
    async fn remove_build_dir(&self, build_dir: &Path) -> bool {
        if !build_dir.exists() {
            return false;
        }
        if let Err(err) = tokio::fs::remove_dir_all(build_dir).await {
            tracing::warn!(path = %build_dir.display(), error = %err, "Failed to remove build directory");
        }
        true
    }
}

/// `cmake --build <dir> [--target <target>]`.
fn build_command(build_dir: &Path, target: Option<&str>) -> Vec<String> {
    let mut command = vec![
        "cmake".to_string(),
        "--build".to_string(),
        build_dir.display().to_string(),
    ];
    if let Some(target) = target {
        command.push("--target".to_string());
        command.push(target.to_string());
    }
    command
}
