//! Storage directory handle

use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::Result;

/// Prefix under which stored images are served to the browser
pub const PUBLIC_PREFIX: &str = "/images";

/// Handle to the flat photo directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the directory if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "image store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a stored file name to its path inside the directory.
    ///
    /// Only a single plain component is accepted; separators, `.`/`..` and
    /// empty names resolve to `None` so nothing outside the directory is
    /// reachable.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.contains(['/', '\\']) {
            return None;
        }
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.dir.join(name)),
            _ => None,
        }
    }

    /// Client-facing path for a stored file, e.g. `/images/abc.jpg`
    pub fn public_path(file_name: &str) -> String {
        format!("{PUBLIC_PREFIX}/{file_name}")
    }
}
