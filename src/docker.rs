//! Docker image resolution for presets.
//!
//! The image table is a JSON file of the form
//!
//! ```json
//! {
//!   "images": { "linux-gcc": "builder-gcc:14" },
//!   "namespace": { "default": "registry.example.com/ci", "linux-gcc": "none" }
//! }
//! ```
//!
//! A preset-specific namespace overrides the default one, and `""` or
//! `"none"` disables the prefix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Namespace values meaning "no namespace".
const NO_NAMESPACE: [&str; 2] = ["", "none"];

/// Whether CI jobs on `os` run in a container. Only Linux agents do.
#[must_use]
pub fn runs_in_container(os: &str) -> bool {
    os == "linux"
}

/// Errors reading the image table.
#[derive(thiserror::Error, Debug)]
pub enum DockerError {
    #[error("Failed to read docker image table {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse docker image table {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Outcome of resolving a preset's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLookup {
    /// Image to run the preset's jobs in.
    Image(String),
    /// The host platform does not run jobs in containers.
    NotNeeded,
    /// The preset has no entry in the table.
    NotFound,
}

/// Parsed docker image table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImages {
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<BTreeMap<String, String>>,
}

impl DockerImages {
    /// Load the table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `DockerError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DockerError> {
        let content = std::fs::read_to_string(path).map_err(|source| DockerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| DockerError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the table from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the content is malformed.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Resolve the image for `preset` as if running on `os`.
    #[must_use]
    pub fn resolve_for_os(&self, preset: &str, os: &str) -> ImageLookup {
        if !runs_in_container(os) {
            return ImageLookup::NotNeeded;
        }
        let Some(image) = self.images.get(preset) else {
            return ImageLookup::NotFound;
        };
        match self.namespace_for(preset) {
            Some(namespace) => ImageLookup::Image(format!("{namespace}/{image}")),
            None => ImageLookup::Image(image.clone()),
        }
    }

    fn namespace_for(&self, preset: &str) -> Option<&str> {
        let table = self.namespace.as_ref()?;
        let namespace = table
            .get(preset)
            .or_else(|| table.get("default"))
            .map(String::as_str)?;
        if NO_NAMESPACE.contains(&namespace) {
            None
        } else {
            Some(namespace)
        }
    }

    /// Presets with an image entry, sorted.
    #[must_use]
    pub fn presets(&self) -> Vec<&str> {
        self.images.keys().map(String::as_str).collect()
    }
}
