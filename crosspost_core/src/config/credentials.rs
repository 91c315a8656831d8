use log::debug;
use serde::{Deserialize, Serialize};

use crate::connections::errors::ConnectionError;

/// Service name under which secrets are stored in the OS keyring.
pub const KEYRING_SERVICE: &str = "crosspost";

fn default_pds() -> String {
    "https://bsky.social".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyCredentials {
    #[serde(default = "default_pds")]
    pub pds: String,
    pub handle: String,
    /// App password. When omitted it is read from the keyring entry
    /// `crosspost` / `<handle>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl BlueskyCredentials {
    pub fn password(&self) -> Result<String, ConnectionError> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        debug!("Looking up Bluesky password for {} in keyring", self.handle);
        let entry = keyring::Entry::new(KEYRING_SERVICE, &self.handle)?;
        Ok(entry.get_password()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MastodonCredentials {
    /// Base URL of the instance, e.g. `https://mastodon.social`.
    pub instance: String,
    pub access_token: String,
}

/// OAuth 1.0a user-context credentials shared by both Twitter handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterCredentials {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl TwitterCredentials {
    pub fn has_blank_field(&self) -> bool {
        [
            &self.app_key,
            &self.app_secret,
            &self.access_token,
            &self.access_token_secret,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
    }
}
