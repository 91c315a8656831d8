use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::HeaderMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::atp_client::AtpClient;
use super::types::{PostRef, Session, SessionEvent};
use crate::connections::errors::ConnectionError;
use crate::connections::xrpc::{
    header_value, Transport, XrpcRequest, XrpcResponse, RATE_LIMIT_LIMIT, RATE_LIMIT_REMAINING,
    RATE_LIMIT_RESET,
};
use crate::storage::RateLimitGate;
use crate::utils::time::format_timestamp;

/// The last `RateLimit-*` triple seen on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds of the next window reset.
    pub reset: i64,
}

impl RateLimitSnapshot {
    /// `None` unless all three headers are present and numeric.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            limit: header_value(headers, RATE_LIMIT_LIMIT)?.parse().ok()?,
            remaining: header_value(headers, RATE_LIMIT_REMAINING)?.parse().ok()?,
            reset: header_value(headers, RATE_LIMIT_RESET)?.parse().ok()?,
        })
    }

    /// True when `remaining / limit * 100` is strictly below `buffer_percent`.
    /// A zero limit always counts as below.
    pub fn is_below_buffer(&self, buffer_percent: u8) -> bool {
        if self.limit == 0 {
            return true;
        }
        u128::from(self.remaining) * 100 < u128::from(buffer_percent) * u128::from(self.limit)
    }
}

/// A [`Transport`] decorator that records rate-limit headers of every
/// response and closes the [`RateLimitGate`] once the remaining budget drops
/// below the configured buffer.
pub struct RateLimitedTransport {
    inner: Arc<dyn Transport>,
    gate: RateLimitGate,
    buffer_percent: u8,
    snapshot: Mutex<Option<RateLimitSnapshot>>,
}

impl RateLimitedTransport {
    pub fn new(inner: Arc<dyn Transport>, gate: RateLimitGate, buffer_percent: u8) -> Self {
        Self {
            inner,
            gate,
            buffer_percent,
            snapshot: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> Option<RateLimitSnapshot> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn track(&self, headers: &HeaderMap) -> Result<(), ConnectionError> {
        let Some(snapshot) = RateLimitSnapshot::from_headers(headers) else {
            return Ok(());
        };
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);

        if snapshot.is_below_buffer(self.buffer_percent) {
            info!(
                "Rate limit buffer reached, after this run poster will pause until {}",
                format_timestamp(snapshot.reset)
            );
            self.gate.write(snapshot.reset)?;
        } else {
            info!(
                "Bluesky rate limit has {} out of {} remaining.",
                snapshot.remaining, snapshot.limit
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for RateLimitedTransport {
    async fn invoke(&self, request: XrpcRequest) -> Result<XrpcResponse, ConnectionError> {
        let response = self.inner.invoke(request).await?;
        self.track(&response.headers)?;
        Ok(response)
    }
}

/// The Bluesky connection handle: an [`AtpClient`] whose traffic all passes
/// through a [`RateLimitedTransport`].
pub struct RateLimitedClient {
    client: AtpClient,
    limiter: Arc<RateLimitedTransport>,
}

impl RateLimitedClient {
    pub fn new(transport: Arc<dyn Transport>, gate: RateLimitGate, buffer_percent: u8) -> Self {
        let limiter = Arc::new(RateLimitedTransport::new(transport, gate, buffer_percent));
        Self {
            client: AtpClient::new(limiter.clone()),
            limiter,
        }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session, ConnectionError> {
        self.client.login(identifier, password).await
    }

    pub async fn login_with_session(&self, exported: &str) -> Result<Session, ConnectionError> {
        self.client.login_with_session(exported).await
    }

    pub fn export_session_string(&self) -> Result<String, ConnectionError> {
        self.client.export_session_string()
    }

    pub fn on_session_change<F>(&self, listener: F)
    where
        F: Fn(SessionEvent, &Session) + Send + Sync + 'static,
    {
        self.client.on_session_change(listener)
    }

    pub fn session(&self) -> Option<Session> {
        self.client.session()
    }

    pub async fn invoke(&self, request: XrpcRequest) -> Result<XrpcResponse, ConnectionError> {
        self.client.invoke(request).await
    }

    /// `None` until a response carrying rate-limit headers has been seen.
    pub fn get_rate_limit(&self) -> Option<RateLimitSnapshot> {
        self.limiter.snapshot()
    }

    /// Handle of the author of `parent`, or an empty string if the thread
    /// can't be fetched (typically because the parent post was deleted).
    pub async fn get_reply_to_user(&self, parent: &PostRef) -> String {
        match self.client.get_post_thread(&parent.uri).await {
            Ok(output) => output.thread.post.author.handle,
            Err(e) => {
                info!("Unable to retrieve reply_to-user of post. Probably a reply to a deleted post.");
                debug!("getPostThread failed for {}: {:?}", parent.uri, e);
                String::new()
            }
        }
    }
}
