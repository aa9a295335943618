//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, CtaskError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file names to search for, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["ctask.yml", "ctask.yaml", "config.yml", "batect.yml"];

/// Find the configuration file in the current directory
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the first configuration file present in `dir`
pub fn find_config_file_from(dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut searched_paths = Vec::new();

    for file_name in CONFIG_FILE_NAMES {
        let config_path = dir.join(file_name);
        if config_path.is_file() {
            return Ok(config_path);
        }
        searched_paths.push(config_path.display().to_string());
    }

    Err(ConfigError::NotFound(searched_paths.join(", ")))
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, CtaskError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e)))?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config, CtaskError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

/// Load the configuration from an explicit path, or discover it in the current directory
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf), CtaskError> {
    let config_path = match explicit {
        Some(path) if path.is_file() => path.to_path_buf(),
        Some(path) => return Err(ConfigError::NotFound(path.display().to_string()).into()),
        None => find_config_file()?,
    };

    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}
