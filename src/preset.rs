//! Build directory layout for presets.

use std::path::{Path, PathBuf};

/// Build directory of `preset`: `<root>/<output_dir>/<preset>`.
#[must_use]
pub fn build_dir(root: &Path, output_dir: &Path, preset: &str) -> PathBuf {
    root.join(output_dir).join(preset)
}
