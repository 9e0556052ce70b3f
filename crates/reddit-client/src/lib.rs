//! Reddit API client for the image fetcher
//!
//! Covers the three upstream-facing steps of the fetch flow:
//! 1. `token::fetch_token()` exchanges app + account credentials for a bearer
//!    token (password grant)
//! 2. `post::parse_post_id()` + `post::fetch_post()` resolve a post URL to the
//!    post's metadata
//! 3. `gallery::extract_image_urls()` turns that metadata into image URLs
//!
//! Nothing here touches the filesystem; downloading lives in `image-store`.

pub mod constants;
pub mod error;
pub mod gallery;
pub mod post;
pub mod token;

pub use constants::*;
pub use error::{Error, Result};
pub use gallery::extract_image_urls;
pub use post::{PostData, fetch_post, parse_post_id};
pub use token::{Credentials, Endpoints, TokenResponse, fetch_token};
