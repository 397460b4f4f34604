use super::ConfigError;
use std::path::PathBuf;

fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeDirectoryUnavailable)
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(home_dir()?.join(".flowsmith/config.yaml"))
}

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    Ok(home_dir()?.join(".flowsmith"))
}
