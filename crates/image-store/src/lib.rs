//! Local image storage for the fetcher
//!
//! One flat directory shared by every request:
//! - `download` streams remote images into it, named by URL basename
//! - `ImageStore::resolve` maps a client-supplied name back to a file
//! - `archive` zips the whole directory in memory and then empties it
//!
//! There is no locking: concurrent fetches and archive downloads see and
//! mutate the same file set.

pub mod archive;
pub mod download;
pub mod error;
pub mod storage;

pub use archive::{Archive, take_archive};
pub use download::{download_all, download_image};
pub use error::{Error, Result};
pub use storage::ImageStore;
