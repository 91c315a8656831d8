use thiserror::Error;

use crate::connections::xrpc::XrpcError;
use crate::core::login_outcome::LoginOutcome;
use crate::core::platform::Platform;

/// A central error enum for connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Xrpc(#[from] XrpcError),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No credentials configured for {0}")]
    MissingCredentials(Platform),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("{platform} login failed: {outcome}")]
    LoginFailed {
        platform: Platform,
        outcome: LoginOutcome,
    },
}

impl ConnectionError {
    /// The XRPC error payload, if the server answered with one.
    pub fn as_xrpc(&self) -> Option<&XrpcError> {
        match self {
            ConnectionError::Xrpc(e) => Some(e),
            _ => None,
        }
    }
}
