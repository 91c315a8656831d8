pub mod rate_limit_gate;
pub mod session_cache;

pub use rate_limit_gate::RateLimitGate;
pub use session_cache::SessionCache;
