pub mod connection_manager;
pub mod login_outcome;
pub mod platform;

pub use connection_manager::ConnectionManager;
pub use login_outcome::LoginOutcome;
pub use platform::Platform;
