//! The single low-level primitive every ATProto call goes through.
//!
//! XRPC queries are `GET <pds>/xrpc/<nsid>?params`, procedures are
//! `POST <pds>/xrpc/<nsid>` with a JSON body. Both answer with a JSON payload
//! and a set of headers; errors carry `{ "error": "...", "message": "..." }`.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::fmt;

use super::errors::ConnectionError;

pub const RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "ratelimit-reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrpcKind {
    Query,
    Procedure,
}

#[derive(Debug, Clone)]
pub struct XrpcRequest {
    pub kind: XrpcKind,
    pub nsid: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Bearer token attached as `Authorization`.
    pub auth: Option<String>,
}

impl XrpcRequest {
    pub fn query(nsid: impl Into<String>) -> Self {
        Self {
            kind: XrpcKind::Query,
            nsid: nsid.into(),
            params: Vec::new(),
            body: None,
            auth: None,
        }
    }

    pub fn procedure(nsid: impl Into<String>) -> Self {
        Self {
            kind: XrpcKind::Procedure,
            ..Self::query(nsid)
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct XrpcResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub content: Value,
}

impl XrpcResponse {
    /// Decode the payload into a typed view.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ConnectionError> {
        Ok(serde_json::from_value(self.content)?)
    }
}

/// A non-2xx XRPC answer.
#[derive(Debug, Clone)]
pub struct XrpcError {
    pub status: u16,
    /// Classification string, e.g. `RateLimitExceeded` or `ExpiredToken`.
    pub error: Option<String>,
    pub message: Option<String>,
    pub headers: HeaderMap,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl XrpcError {
    pub fn from_parts(status: u16, headers: HeaderMap, content: &Value) -> Self {
        let body: ErrorBody = serde_json::from_value(content.clone()).unwrap_or(ErrorBody {
            error: None,
            message: None,
        });
        Self {
            status,
            error: body.error,
            message: body.message,
            headers,
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.error.as_deref() == Some(kind)
    }

    pub fn is_rate_limit_exceeded(&self) -> bool {
        self.is("RateLimitExceeded") || self.status == 429
    }

    pub fn is_expired_token(&self) -> bool {
        self.is("ExpiredToken") || self.is("InvalidToken")
    }

    /// `RateLimit-Reset` as epoch seconds, if the server sent it.
    pub fn rate_limit_reset(&self) -> Option<i64> {
        header_value(&self.headers, RATE_LIMIT_RESET)?.parse().ok()
    }
}

impl fmt::Display for XrpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XRPC error {}", self.status)?;
        if let Some(error) = &self.error {
            write!(f, " {}", error)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for XrpcError {}

pub(crate) fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok().map(str::trim)
}

/// Sends one XRPC request and hands back the response with its headers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, request: XrpcRequest) -> Result<XrpcResponse, ConnectionError>;
}
