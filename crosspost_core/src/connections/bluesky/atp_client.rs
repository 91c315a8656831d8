use log::{debug, info};
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};

use super::types::{PostThreadOutput, Session, SessionEvent};
use crate::connections::errors::ConnectionError;
use crate::connections::xrpc::{Transport, XrpcRequest, XrpcResponse};

pub type SessionListener = Box<dyn Fn(SessionEvent, &Session) + Send + Sync>;

/// Minimal ATProto client: session handling plus authenticated XRPC calls.
///
/// Every request, including the login ones, goes through `transport`, so a
/// decorating transport sees the whole traffic of this client.
pub struct AtpClient {
    transport: Arc<dyn Transport>,
    session: Mutex<Option<Session>>,
    listeners: Mutex<Vec<SessionListener>>,
}

impl AtpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback run every time the session is set or rotated.
    pub fn on_session_change<F>(&self, listener: F)
    where
        F: Fn(SessionEvent, &Session) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    pub fn session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn export_session_string(&self) -> Result<String, ConnectionError> {
        self.current_session()?.export()
    }

    /// Password login (`com.atproto.server.createSession`).
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session, ConnectionError> {
        let request = XrpcRequest::procedure("com.atproto.server.createSession").body(json!({
            "identifier": identifier,
            "password": password,
        }));
        let session: Session = self.transport.invoke(request).await?.decode()?;
        info!("Created session for {} ({})", session.handle, session.did);
        self.set_session(SessionEvent::Create, session.clone());
        Ok(session)
    }

    /// Resume an exported session. The tokens are refreshed right away so a
    /// stale access token never reaches a real call.
    pub async fn login_with_session(&self, exported: &str) -> Result<Session, ConnectionError> {
        let session = Session::import(exported)?;
        debug!("Imported session for {}", session.handle);
        self.set_session(SessionEvent::Import, session);
        self.refresh_session().await
    }

    /// `com.atproto.server.refreshSession`, authenticated with the refresh token.
    pub async fn refresh_session(&self) -> Result<Session, ConnectionError> {
        let refresh_jwt = self.current_session()?.refresh_jwt;
        let request = XrpcRequest::procedure("com.atproto.server.refreshSession").auth(refresh_jwt);
        let session: Session = self.transport.invoke(request).await?.decode()?;
        debug!("Session refreshed for {}", session.handle);
        self.set_session(SessionEvent::Refresh, session.clone());
        Ok(session)
    }

    /// Authenticated call. An `ExpiredToken` answer rotates the session once
    /// and re-issues the request with the new access token.
    pub async fn invoke(&self, request: XrpcRequest) -> Result<XrpcResponse, ConnectionError> {
        let access_jwt = self.current_session()?.access_jwt;
        match self.transport.invoke(request.clone().auth(access_jwt)).await {
            Err(ConnectionError::Xrpc(e)) if e.is_expired_token() => {
                debug!("Access token expired during {}, refreshing", request.nsid);
                let session = self.refresh_session().await?;
                self.transport.invoke(request.auth(session.access_jwt)).await
            }
            other => other,
        }
    }

    pub(crate) async fn get_post_thread(&self, uri: &str) -> Result<PostThreadOutput, ConnectionError> {
        let request = XrpcRequest::query("app.bsky.feed.getPostThread")
            .param("uri", uri)
            .param("depth", "0");
        self.invoke(request).await?.decode()
    }

    fn current_session(&self) -> Result<Session, ConnectionError> {
        self.session().ok_or(ConnectionError::NotAuthenticated)
    }

    fn set_session(&self, event: SessionEvent, session: Session) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(event, &session);
        }
    }
}
