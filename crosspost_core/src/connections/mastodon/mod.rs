pub mod mastodon_client;

pub use mastodon_client::MastodonClient;
