//! Shared types for the Reddit image fetcher workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
