use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::info;
use serde::{Deserialize, Serialize};

use super::credentials::{BlueskyCredentials, MastodonCredentials, TwitterCredentials};
use crate::connections::errors::ConnectionError;

const DEFAULT_RATE_LIMIT_BUFFER: u8 = 10;

fn default_rate_limit_buffer() -> u8 {
    DEFAULT_RATE_LIMIT_BUFFER
}

/// `~/.config/crosspost` and `~/.local/share/crosspost` on Linux,
/// `%APPDATA%\crosspost` on Windows, etc.
fn project_dirs() -> Result<ProjectDirs, ConnectionError> {
    ProjectDirs::from("", "", "crosspost")
        .ok_or_else(|| ConnectionError::Config("Unable to locate home directory".into()))
}

/// Everything the connection layer needs from the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Percentage of the Bluesky budget kept in reserve (0–100).
    #[serde(default = "default_rate_limit_buffer")]
    pub rate_limit_buffer: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cache_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bluesky: Option<BlueskyCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastodon: Option<MastodonCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCredentials>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate_limit_buffer: DEFAULT_RATE_LIMIT_BUFFER,
            session_cache_path: None,
            rate_limit_path: None,
            bluesky: None,
            mastodon: None,
            twitter: None,
        }
    }
}

impl Settings {
    /// Default location of the settings file.
    pub fn default_path() -> Result<PathBuf, ConnectionError> {
        Ok(project_dirs()?.config_dir().join("settings.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConnectionError> {
        info!("Loading settings from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConnectionError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.rate_limit_buffer > 100 {
            return Err(ConnectionError::Config(format!(
                "rate_limit_buffer must be between 0 and 100, got {}",
                self.rate_limit_buffer
            )));
        }
        Ok(())
    }

    pub fn session_cache_path(&self) -> Result<PathBuf, ConnectionError> {
        match &self.session_cache_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_local_dir().join("bluesky_session.txt")),
        }
    }

    pub fn rate_limit_path(&self) -> Result<PathBuf, ConnectionError> {
        match &self.rate_limit_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_local_dir().join("rate_limit.txt")),
        }
    }
}
