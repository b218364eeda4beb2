//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::log::SinkKind;
use crate::run::{Severity, DEFAULT_COLOR_ENV};

/// Settings for the CI actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    /// Build output directory, relative to the project root.
    pub output_dir: PathBuf,
    /// Docker image table, relative to the project root.
    pub docker_images: PathBuf,
    /// CMake generator passed to `-G`.
    pub generator: String,
    /// Variable set to force colored output from configure steps.
    pub color_env: String,
    /// Output renderer.
    pub sink: SinkKind,
    /// Lines below this severity are not rendered.
    pub min_severity: Severity,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output").join("build"),
            docker_images: PathBuf::from("ci").join("dockerImages.json"),
            generator: "Ninja".to_string(),
            color_env: DEFAULT_COLOR_ENV.to_string(),
            sink: SinkKind::Auto,
            min_severity: Severity::Info,
        }
    }
}

impl CiConfig {
    /// Absolute path of the docker image table for a project root.
    #[must_use]
    pub fn docker_images_path(&self, root: &Path) -> PathBuf {
        root.join(&self.docker_images)
    }
}
