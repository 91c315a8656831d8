#![allow(dead_code)]

pub mod fake_transport;

use crosspost_core::Settings;
use log::LevelFilter;
use std::path::Path;

//   Logs will appear only when you run with `-- --nocapture`
//   or when the test fails.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Settings with every platform configured and state files under `dir`.
pub fn test_settings(dir: &Path) -> Settings {
    let mut settings = Settings::from_json(
        r#"{
            "rate_limit_buffer": 10,
            "bluesky": { "pds": "https://pds.example", "handle": "bot.example.com", "password": "app-password" },
            "mastodon": { "instance": "https://mastodon.example", "access_token": "m-token" },
            "twitter": {
                "app_key": "k", "app_secret": "s",
                "access_token": "at", "access_token_secret": "ats"
            }
        }"#,
    )
    .expect("test settings parse");
    settings.session_cache_path = Some(dir.join("session.txt"));
    settings.rate_limit_path = Some(dir.join("rate_limit.txt"));
    settings
}
