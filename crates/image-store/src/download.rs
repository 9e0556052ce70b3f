//! Streaming image downloads into the store

use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{Error, Result};
use crate::storage::ImageStore;

/// Basename of a URL's path: `https://i.redd.it/abc.jpg?x=1` -> `abc.jpg`
pub fn file_name_for(image_url: &str) -> Result<String> {
    let url = Url::parse(image_url)
        .map_err(|e| Error::Download(format!("invalid image URL {image_url}: {e}")))?;
    let name = url.path().rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return Err(Error::Download(format!(
            "image URL has no file name: {image_url}"
        )));
    }
    Ok(name.to_owned())
}

/// Download one image and return its client-facing path.
///
/// The body is streamed to a hidden `.part` file and renamed into place once
/// complete, so an existing file with the same name is replaced only by a
/// full download.
#[instrument(skip(client, store))]
pub async fn download_image(
    client: &reqwest::Client,
    store: &ImageStore,
    image_url: &str,
) -> Result<String> {
    let file_name = file_name_for(image_url)?;
    let path = store
        .resolve(&file_name)
        .ok_or_else(|| Error::Download(format!("unusable file name {file_name:?}")))?;

    let response = client
        .get(image_url)
        .send()
        .await
        .map_err(|e| Error::Download(format!("request to {image_url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Download(format!("{image_url} returned {status}")));
    }

    let part = PartFile::new(store.dir().join(format!(".{file_name}.part")));
    let mut file = tokio::fs::File::create(part.path()).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| Error::Download(format!("stream error from {image_url}: {e}")))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);
    part.commit(&path).await?;

    debug!(file = %path.display(), bytes = written, "image stored");
    Ok(ImageStore::public_path(&file_name))
}

/// In-progress download target. Removed on drop unless committed, which
/// covers both errors and futures cancelled mid-write.
struct PartFile {
    path: PathBuf,
    committed: bool,
}

impl PartFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(mut self, target: &Path) -> Result<()> {
        tokio::fs::rename(&self.path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Download every URL, at most `concurrency` at a time.
///
/// Returned paths follow input order. The first failure aborts the batch;
/// files already written stay where they are.
pub async fn download_all(
    client: &reqwest::Client,
    store: &ImageStore,
    image_urls: &[String],
    concurrency: usize,
) -> Result<Vec<String>> {
    let paths: Vec<String> = stream::iter(image_urls.iter().cloned())
        .map(|image_url| async move { download_image(client, store, &image_url).await })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    info!(count = paths.len(), "images downloaded");
    Ok(paths)
}
