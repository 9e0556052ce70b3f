//! Error types for Reddit API operations

/// Errors from token exchange, post resolution and post lookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The only input validation the fetch flow performs
    #[error("Invalid Reddit URL: {0}")]
    InvalidUrl(String),

    #[error("no post id follows 'comments' in {0}")]
    MissingPostId(String),

    #[error("post lookup failed: {0}")]
    Fetch(String),
}

impl Error {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::InvalidUrl(_) | Error::MissingPostId(_) => "resolution",
            Error::Fetch(_) => "fetch",
        }
    }
}

/// Result alias for Reddit API operations.
pub type Result<T> = std::result::Result<T, Error>;
