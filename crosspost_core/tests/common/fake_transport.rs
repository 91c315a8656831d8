//! A scripted **in‑process stand‑in** for the XRPC transport.
//!
//! *  Queue answers per NSID with `reply_ok` / `reply_err`; they are served in
//!    order. An NSID with nothing queued answers `MethodNotImplemented`.
//! *  Every request the client sent is kept in `requests()` for assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use crosspost_core::connections::{
    ConnectionError, Transport, XrpcError, XrpcRequest, XrpcResponse,
};
use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

enum Reply {
    Ok { content: Value, headers: HeaderMap },
    Err { status: u16, error: String, headers: HeaderMap },
}

#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<XrpcRequest>>,
}

fn header_map(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(*name, value.parse().expect("valid header value"));
    }
    headers
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, nsid: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(nsid.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn reply_ok(&self, nsid: &str, content: Value) {
        self.reply_ok_with_headers(nsid, content, &[]);
    }

    pub fn reply_ok_with_headers(&self, nsid: &str, content: Value, headers: &[(&'static str, &str)]) {
        self.push(
            nsid,
            Reply::Ok {
                content,
                headers: header_map(headers),
            },
        );
    }

    pub fn reply_err(&self, nsid: &str, status: u16, error: &str, headers: &[(&'static str, &str)]) {
        self.push(
            nsid,
            Reply::Err {
                status,
                error: error.to_string(),
                headers: header_map(headers),
            },
        );
    }

    pub fn requests(&self) -> Vec<XrpcRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, nsid: &str) -> usize {
        self.requests().iter().filter(|r| r.nsid == nsid).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn invoke(&self, request: XrpcRequest) -> Result<XrpcResponse, ConnectionError> {
        let nsid = request.nsid.clone();
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&nsid)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Ok { content, headers }) => Ok(XrpcResponse {
                status: 200,
                headers,
                content,
            }),
            Some(Reply::Err {
                status,
                error,
                headers,
            }) => Err(XrpcError::from_parts(
                status,
                headers,
                &json!({ "error": error, "message": format!("{error} (scripted)") }),
            )
            .into()),
            None => Err(XrpcError::from_parts(
                501,
                HeaderMap::new(),
                &json!({ "error": "MethodNotImplemented", "message": nsid }),
            )
            .into()),
        }
    }
}

/// `createSession` / `refreshSession` payload.
pub fn session_json(access: &str, refresh: &str) -> Value {
    json!({
        "accessJwt": access,
        "refreshJwt": refresh,
        "handle": "bot.example.com",
        "did": "did:plc:bot",
        "active": true
    })
}
