//! Error types for storage, download and archive operations

/// Errors from the image store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("download failed: {0}")]
    Download(String),

    #[error("archive failed: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Download(_) => "download",
            Error::Archive(_) => "archive",
            Error::Io(_) => "io",
        }
    }
}

/// Result alias for image store operations.
pub type Result<T> = std::result::Result<T, Error>;
