use log::info;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::config::MastodonCredentials;
use crate::connections::errors::ConnectionError;

/// Credentialed Mastodon API handle. Building it does not touch the network.
#[derive(Debug, Clone)]
pub struct MastodonClient {
    http: reqwest::Client,
    api_base_url: String,
}

impl MastodonClient {
    pub fn new(credentials: &MastodonCredentials) -> Result<Self, ConnectionError> {
        info!("Connecting to Mastodon API.");
        let mut auth = HeaderValue::try_from(format!("Bearer {}", credentials.access_token))
            .map_err(|_| ConnectionError::Config("Mastodon access token is not a valid header value".into()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            api_base_url: credentials.instance.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Absolute URL of an API path such as `/api/v1/statuses`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// The underlying client, already carrying the bearer token.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
