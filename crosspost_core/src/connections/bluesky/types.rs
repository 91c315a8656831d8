use serde::{Deserialize, Serialize};

use crate::connections::errors::ConnectionError;

/// An authenticated ATProto session as returned by `createSession` / `refreshSession`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub handle: String,
    pub did: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl Session {
    /// Opaque string form stored in the session cache.
    pub fn export(&self) -> Result<String, ConnectionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn import(exported: &str) -> Result<Self, ConnectionError> {
        serde_json::from_str(exported.trim())
            .map_err(|e| ConnectionError::InvalidSession(e.to_string()))
    }
}

/// Why the client's session was (re)set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Fresh password login.
    Create,
    /// A cached session string was loaded.
    Import,
    /// The server rotated the tokens.
    Refresh,
}

/// Strong reference to a record (`com.atproto.repo.strongRef`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    pub uri: String,
    pub cid: String,
}

/// The parts of `app.bsky.feed.getPostThread` the reply lookup reads.
#[derive(Debug, Deserialize)]
pub(crate) struct PostThreadOutput {
    pub thread: ThreadViewPost,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadViewPost {
    pub post: PostView,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostView {
    pub author: ProfileViewBasic,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileViewBasic {
    pub handle: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_uses_atproto_field_names() {
        let session = Session::import(
            r#"{"accessJwt":"a","refreshJwt":"r","handle":"bot.example","did":"did:plc:x","active":true}"#,
        )
        .unwrap();
        assert_eq!(session.access_jwt, "a");
        assert_eq!(session.refresh_jwt, "r");

        let exported = session.export().unwrap();
        assert!(exported.contains("\"accessJwt\":\"a\""));
        assert_eq!(Session::import(&exported).unwrap(), session);
    }

    #[test]
    fn garbage_session_string_is_invalid() {
        let err = Session::import("not a session").unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidSession(_)));
    }
}
