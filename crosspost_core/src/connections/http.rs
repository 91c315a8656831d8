use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::time::Duration;

use super::errors::ConnectionError;
use super::xrpc::{Transport, XrpcError, XrpcKind, XrpcRequest, XrpcResponse};

const USER_AGENT: &str = concat!("crosspost/", env!("CARGO_PKG_VERSION"));

/// XRPC over HTTPS against a single PDS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ConnectionError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(&self, request: XrpcRequest) -> Result<XrpcResponse, ConnectionError> {
        let url = format!("{}/xrpc/{}", self.base_url, request.nsid);
        debug!("{:?} {}", request.kind, url);

        let mut builder = match request.kind {
            XrpcKind::Query => self.http.get(&url).query(&request.params),
            XrpcKind::Procedure => {
                let builder = self.http.post(&url).query(&request.params);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };
        if let Some(token) = &request.auth {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // error bodies are best effort, the status alone still classifies
            let content = parse_body(&bytes).unwrap_or(Value::Null);
            return Err(XrpcError::from_parts(status.as_u16(), headers, &content).into());
        }
        let content = parse_body(&bytes)?;
        Ok(XrpcResponse {
            status: status.as_u16(),
            headers,
            content,
        })
    }
}

/// An empty body is `null`; anything else must be JSON.
fn parse_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body(b"").unwrap(), Value::Null);
        assert_eq!(parse_body(b" \n").unwrap(), Value::Null);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err: ConnectionError = parse_body(b"<html>bad gateway</html>").unwrap_err().into();
        assert!(matches!(err, ConnectionError::Decode(_)));
    }

    #[test]
    fn json_body_is_kept() {
        assert_eq!(
            parse_body(br#"{"handle":"bot.example.com"}"#).unwrap(),
            serde_json::json!({ "handle": "bot.example.com" })
        );
    }
}
