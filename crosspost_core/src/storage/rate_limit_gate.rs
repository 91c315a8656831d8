use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::utils::time::{format_timestamp, humanize, now_timestamp};

/// A persisted "blocked until" timestamp.
///
/// Every run of the bot is a fresh process, so the decision to pause has to
/// survive on disk: the file holds a bare epoch-seconds value and its presence
/// (with a future value) means no rate-limited work should be attempted.
#[derive(Debug, Clone)]
pub struct RateLimitGate {
    path: PathBuf,
}

impl RateLimitGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_blocked(&self) -> io::Result<bool> {
        self.is_blocked_at(now_timestamp())
    }

    /// Same as [`is_blocked`](Self::is_blocked) with an explicit clock.
    /// An expired or unreadable marker is deleted.
    pub fn is_blocked_at(&self, now: i64) -> io::Result<bool> {
        info!("Checking if application has reached rate limit buffer limit.");
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        match content.trim().parse::<i64>() {
            Ok(resume_at) if resume_at > now => {
                info!(
                    "Rate limit buffer reached, will resume posting {} ({})",
                    humanize(resume_at, now),
                    format_timestamp(resume_at)
                );
                Ok(true)
            }
            Ok(_) => {
                self.clear()?;
                Ok(false)
            }
            Err(_) => {
                warn!(
                    "Ignoring unreadable rate limit marker {:?} in {}",
                    content,
                    self.path.display()
                );
                self.clear()?;
                Ok(false)
            }
        }
    }

    /// The stored timestamp, without expiring anything.
    pub fn blocked_until(&self) -> io::Result<Option<i64>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.trim().parse().ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persist `reset` as the new marker, replacing any previous one.
    pub fn write(&self, reset: i64) -> io::Result<()> {
        info!("Saving ratelimit-reset time");
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::File::create(&self.path)?;
        write!(file, "{}", reset)?;
        file.sync_all()
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn missing_marker_is_not_blocked() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));

        assert!(!gate.is_blocked_at(NOW).unwrap());
        assert_eq!(gate.blocked_until().unwrap(), None);
    }

    #[test]
    fn future_marker_blocks_and_is_kept() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));

        gate.write(NOW + 600).unwrap();

        assert!(gate.is_blocked_at(NOW).unwrap());
        assert!(gate.path().exists(), "a live marker must not be consumed");
    }

    #[test]
    fn expired_marker_is_deleted() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));

        gate.write(NOW - 1).unwrap();

        assert!(!gate.is_blocked_at(NOW).unwrap());
        assert!(!gate.path().exists());
    }

    #[test]
    fn marker_equal_to_now_has_expired() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));

        gate.write(NOW).unwrap();

        assert!(!gate.is_blocked_at(NOW).unwrap());
    }

    #[test]
    fn write_overwrites_with_bare_timestamp() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));

        gate.write(NOW + 10).unwrap();
        gate.write(NOW + 20).unwrap();

        assert_eq!(
            fs::read_to_string(gate.path()).unwrap(),
            (NOW + 20).to_string()
        );
        assert_eq!(gate.blocked_until().unwrap(), Some(NOW + 20));
    }

    #[test]
    fn garbage_marker_is_discarded() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));
        fs::write(gate.path(), "tomorrow-ish").unwrap();

        assert!(!gate.is_blocked_at(NOW).unwrap());
        assert!(!gate.path().exists());
    }

    #[test]
    fn marker_with_trailing_newline_is_accepted() {
        let dir = tempdir().unwrap();
        let gate = RateLimitGate::new(dir.path().join("rate_limit.txt"));
        fs::write(gate.path(), format!("{}\n", NOW + 5)).unwrap();

        assert!(gate.is_blocked_at(NOW).unwrap());
    }
}
