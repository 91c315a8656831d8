pub mod atp_client;
pub mod rate_limited_client;
pub mod types;

pub use atp_client::AtpClient;
pub use rate_limited_client::{RateLimitSnapshot, RateLimitedClient, RateLimitedTransport};
pub use types::{PostRef, Session, SessionEvent};
