pub mod twitter_client;

pub use twitter_client::{TwitterApi, TwitterClient};
