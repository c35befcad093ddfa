//! Locating configuration files and the data directory.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

const CONFIG_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Config files in precedence order: user config, then project-local.
///
/// Explicit `--config` files replace discovery and must exist.
pub fn config_files(explicit: &[PathBuf], cwd: &Path) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        for path in explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
        }
        return Ok(explicit.to_vec());
    }

    let mut files = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        let dir = dir.join("taskboard");
        files.extend(CONFIG_EXTENSIONS.iter().map(|ext| dir.join(format!("config.{ext}"))));
    }
    files.extend(
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| cwd.join(format!(".taskboard.{ext}"))),
    );
    Ok(files.into_iter().filter(|p| p.is_file()).collect())
}

/// `--data-dir` / `TASKBOARD_DATA_DIR`, else the platform data directory
pub fn data_dir(flag: Option<&Path>) -> PathBuf {
    match flag {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir()
            .map(|d| d.join("taskboard"))
            .unwrap_or_else(|| PathBuf::from(".taskboard")),
    }
}
