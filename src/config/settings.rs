use super::{default_state_root, ConfigError};
use crate::quota::{SubscriptionTier, Tier};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api_base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub state_root: Option<PathBuf>,
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Settings(
                "`api_base_url` must be non-empty".to_string(),
            ));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::Settings(
                "`api_base_url` must start with http:// or https://".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "`request_timeout_seconds` must be > 0".to_string(),
            ));
        }
        if let Some(token) = &self.auth_token {
            if token.trim().is_empty() {
                return Err(ConfigError::Settings(
                    "`auth_token` must be non-empty when present".to_string(),
                ));
            }
        }
        if let Some(state_root) = &self.state_root {
            if !state_root.is_absolute() {
                return Err(ConfigError::Settings(
                    "`state_root` must be an absolute path".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    pub fn tier(&self) -> Tier {
        Tier::classify(self.is_authenticated(), self.subscription_tier)
    }

    pub fn resolve_state_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_root {
            Some(root) => Ok(root.clone()),
            None => default_state_root(),
        }
    }
}
