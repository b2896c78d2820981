//! Locating and loading `parity.toml`.

use std::path::{Path, PathBuf};

use parity_config::{
    load_config, load_config_from_str, ConfigError, HarnessConfig, CONFIG_FILE_NAME,
};

use crate::GlobalArgs;

/// Loads the configuration named by `--config`, or `./parity.toml` if it
/// exists, or the defaults.
///
/// `--config` may name a file or a directory holding `parity.toml`.
pub fn load(global: &GlobalArgs) -> Result<HarnessConfig, ConfigError> {
    match global.config.as_deref().map(PathBuf::from) {
        Some(path) if path.is_dir() => load_config(&path),
        Some(path) => load_file(&path),
        None if Path::new(CONFIG_FILE_NAME).is_file() => load_config(Path::new(".")),
        None => {
            tracing::debug!("no {CONFIG_FILE_NAME} found, using defaults");
            Ok(HarnessConfig::default())
        }
    }
}

fn load_file(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}
