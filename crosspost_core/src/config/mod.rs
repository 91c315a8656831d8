pub mod credentials;
pub mod settings;

pub use credentials::{BlueskyCredentials, MastodonCredentials, TwitterCredentials};
pub use settings::Settings;
