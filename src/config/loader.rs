//! Locating and reading the `ci-action` TOML file.
//!
//! A project keeps its settings in `<root>/.ci-action.toml`. Agents that
//! share settings across checkouts can put them in
//! `<user config dir>/ci-action/config.toml` instead. The first file found
//! wins; without either, every action runs on [`CiConfig::default`].

use std::path::{Path, PathBuf};

use super::CiConfig;

/// Per-project settings file, relative to the project root.
pub const PROJECT_CONFIG_FILE: &str = ".ci-action.toml";

/// Finds the settings file for a project.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Candidate files, project file first.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Look in `root` first, then in the per-user `ci-action` directory.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        let mut search_paths = Vec::new();

        search_paths.push(root.join(PROJECT_CONFIG_FILE));
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("ci-action").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Read only `path`, as given by `--config`.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Read the first candidate that exists. A missing file is not an error:
    /// the defaults build into `output/build` and look up Docker images in
    /// `ci/dockerImages.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the chosen file cannot be read or is not
    /// valid TOML for [`CiConfig`].
    pub fn load(&self) -> Result<CiConfig, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(CiConfig::default())
    }

    fn load_from_path(path: &Path) -> Result<CiConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Candidate files in lookup order.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// Failure reading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}
