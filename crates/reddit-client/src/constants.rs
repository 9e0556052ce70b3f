//! Reddit API constants
//!
//! Paths are appended to the configurable base URLs so tests can point the
//! client at a local mock.

/// Public token endpoint host (password grant lives here, not on oauth.reddit.com)
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";

/// Authenticated data API host
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Token endpoint path relative to the auth base
pub const TOKEN_PATH: &str = "/api/v1/access_token";

/// Comments endpoint path relative to the API base; the post id follows it
pub const COMMENTS_PATH: &str = "/comments";

/// Reddit rejects requests without a descriptive User-Agent
pub const DEFAULT_USER_AGENT: &str = "reddit-image-fetcher/0.1";

/// Path segment that precedes the post id in a post permalink
pub const POST_MARKER: &str = "comments";

/// Suffixes that mark a non-gallery post's `url` as a direct image link.
/// Matched case-sensitively against the raw URL, query string included.
pub const IMAGE_SUFFIXES: &[&str] = &["jpg", "png", "jpeg"];
