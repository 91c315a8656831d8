pub mod config;
pub mod connections;
pub mod core;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use config::Settings;
pub use connections::bluesky::{PostRef, RateLimitSnapshot, RateLimitedClient};
pub use connections::errors::ConnectionError;
pub use self::core::{ConnectionManager, LoginOutcome, Platform};
pub use storage::{RateLimitGate, SessionCache};
