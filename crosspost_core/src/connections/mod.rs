pub mod bluesky;
pub mod errors;
pub mod http;
pub mod mastodon;
pub mod twitter;
pub mod xrpc;

// Re-export the modules here for easy import elsewhere.
pub use errors::*;
pub use http::HttpTransport;
pub use xrpc::{Transport, XrpcError, XrpcKind, XrpcRequest, XrpcResponse};
