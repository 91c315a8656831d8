use std::fmt::{self, Display};

use crate::connections::errors::ConnectionError;

/// Result of one Bluesky login attempt, classified so the caller can decide
/// which piece of persisted state to touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Carries `RateLimit-Reset` when the server sent one.
    RateLimitExceeded(Option<i64>),
    /// The cached session is no longer accepted.
    ExpiredToken,
    Other(String),
}

impl LoginOutcome {
    pub fn classify(err: &ConnectionError) -> Self {
        // an unreadable cached session is as unusable as an expired one
        if let ConnectionError::InvalidSession(_) = err {
            return LoginOutcome::ExpiredToken;
        }
        match err.as_xrpc() {
            Some(e) if e.is_rate_limit_exceeded() => LoginOutcome::RateLimitExceeded(e.rate_limit_reset()),
            Some(e) if e.is_expired_token() => LoginOutcome::ExpiredToken,
            _ => LoginOutcome::Other(err.to_string()),
        }
    }
}

impl Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginOutcome::Success => write!(f, "success"),
            LoginOutcome::RateLimitExceeded(Some(reset)) => {
                write!(f, "rate limit exceeded (resets at {})", reset)
            }
            LoginOutcome::RateLimitExceeded(None) => write!(f, "rate limit exceeded"),
            LoginOutcome::ExpiredToken => write!(f, "session token expired"),
            LoginOutcome::Other(detail) => write!(f, "{}", detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::xrpc::XrpcError;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    fn xrpc(status: u16, error: &str, headers: HeaderMap) -> ConnectionError {
        XrpcError::from_parts(status, headers, &json!({ "error": error, "message": "nope" })).into()
    }

    #[test]
    fn rate_limit_exceeded_carries_reset_header() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-reset", "1700000300".parse().unwrap());

        let outcome = LoginOutcome::classify(&xrpc(429, "RateLimitExceeded", headers));

        assert_eq!(outcome, LoginOutcome::RateLimitExceeded(Some(1_700_000_300)));
    }

    #[test]
    fn expired_and_invalid_tokens_are_poisoned_sessions() {
        for kind in ["ExpiredToken", "InvalidToken"] {
            let outcome = LoginOutcome::classify(&xrpc(400, kind, HeaderMap::new()));
            assert_eq!(outcome, LoginOutcome::ExpiredToken);
        }
    }

    #[test]
    fn unreadable_cached_session_counts_as_expired() {
        let outcome = LoginOutcome::classify(&ConnectionError::InvalidSession("EOF".into()));
        assert_eq!(outcome, LoginOutcome::ExpiredToken);
    }

    #[test]
    fn everything_else_is_other() {
        let outcome = LoginOutcome::classify(&xrpc(401, "AuthenticationRequired", HeaderMap::new()));
        assert!(matches!(outcome, LoginOutcome::Other(ref d) if d.contains("AuthenticationRequired")));

        let outcome = LoginOutcome::classify(&ConnectionError::NotAuthenticated);
        assert_eq!(outcome, LoginOutcome::Other("Not authenticated".into()));
    }
}
