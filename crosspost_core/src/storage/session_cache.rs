use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::info;

/// The exported Bluesky session, kept in a single file so a new process can
/// resume it instead of spending a password login.
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored session, or `Ok(None)` on a first run.
    pub fn read(&self) -> io::Result<Option<String>> {
        info!("Reading session cache");
        match fs::read_to_string(&self.path) {
            Ok(session) => Ok(Some(session)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} not found.", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrite the cache. The data is synced to disk before this returns.
    pub fn write(&self, session: &str) -> io::Result<()> {
        info!("Saving session cache");
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::File::create(&self.path)?;
        file.write_all(session.as_bytes())?;
        file.sync_all()
    }

    /// Delete the cache (`Ok(true)` if removed, `Ok(false)` if it didn't exist).
    pub fn remove(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
