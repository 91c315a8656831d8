use log::info;

use crate::config::TwitterCredentials;
use crate::connections::errors::ConnectionError;

const API_V1_BASE: &str = "https://api.twitter.com/1.1";
const API_V2_BASE: &str = "https://api.twitter.com/2";

/// Twitter exposes media uploads only on the v1.1 API and tweeting only on
/// v2, so the bot keeps one handle for each. Both carry the same OAuth 1.0a
/// user credentials.
#[derive(Debug, Clone)]
struct TwitterHandle {
    http: reqwest::Client,
    credentials: TwitterCredentials,
    base_url: &'static str,
}

impl TwitterHandle {
    fn new(credentials: &TwitterCredentials, base_url: &'static str) -> Result<Self, ConnectionError> {
        if credentials.has_blank_field() {
            return Err(ConnectionError::Config(
                "Twitter credentials must not be empty".into(),
            ));
        }
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            credentials: credentials.clone(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// v1.1 API handle (OAuth1 user context).
#[derive(Debug, Clone)]
pub struct TwitterApi {
    inner: TwitterHandle,
}

impl TwitterApi {
    pub fn new(credentials: &TwitterCredentials) -> Result<Self, ConnectionError> {
        info!("Connecting to Twitter API.");
        Ok(Self {
            inner: TwitterHandle::new(credentials, API_V1_BASE)?,
        })
    }

    pub fn url(&self, path: &str) -> String {
        self.inner.url(path)
    }

    pub fn credentials(&self) -> &TwitterCredentials {
        &self.inner.credentials
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }
}

/// v2 API handle.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    inner: TwitterHandle,
}

impl TwitterClient {
    pub fn new(credentials: &TwitterCredentials) -> Result<Self, ConnectionError> {
        info!("Connecting to Twitter Client.");
        Ok(Self {
            inner: TwitterHandle::new(credentials, API_V2_BASE)?,
        })
    }

    pub fn url(&self, path: &str) -> String {
        self.inner.url(path)
    }

    pub fn credentials(&self) -> &TwitterCredentials {
        &self.inner.credentials
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }
}
