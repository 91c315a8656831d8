use std::fmt::{self, Display};

/// One connection slot in the [`ConnectionManager`](super::ConnectionManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Bluesky,
    Mastodon,
    /// Twitter v1.1 API (media uploads).
    TwitterApi,
    /// Twitter v2 client (tweets).
    TwitterClient,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Bluesky,
        Platform::Mastodon,
        Platform::TwitterApi,
        Platform::TwitterClient,
    ];
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Bluesky => "Bluesky",
            Platform::Mastodon => "Mastodon",
            Platform::TwitterApi => "Twitter API",
            Platform::TwitterClient => "Twitter Client",
        };
        f.write_str(name)
    }
}
