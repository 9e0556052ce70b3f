//! In-memory ZIP of the store, followed by a purge

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::storage::ImageStore;

/// A finished archive ready to send.
#[derive(Debug)]
pub struct Archive {
    pub bytes: Vec<u8>,
    pub entries: usize,
}

/// Zip every regular file in the store, then empty the directory.
///
/// The purge only runs when the archive was built; on failure the
/// directory is left as it was.
#[instrument(skip_all, fields(dir = %store.dir().display()))]
pub async fn take_archive(store: &ImageStore) -> Result<Archive> {
    take_archive_with(store, build_archive).await
}

async fn take_archive_with<F>(store: &ImageStore, build: F) -> Result<Archive>
where
    F: FnOnce(&Path) -> Result<Archive> + Send + 'static,
{
    let dir = store.dir().to_path_buf();
    let archive = tokio::task::spawn_blocking(move || build(&dir))
        .await
        .map_err(|e| Error::Archive(format!("archive task failed: {e}")))??;

    purge(store.dir())
        .await
        .map_err(|e| Error::Archive(format!("failed to reset photo directory: {e}")))?;

    info!(entries = archive.entries, bytes = archive.bytes.len(), "archive built, store purged");
    Ok(archive)
}

/// Build the ZIP synchronously. Entries are named by bare file name and
/// sorted; subdirectories are skipped.
pub fn build_archive(dir: &Path) -> Result<Archive> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(archive_io)? {
        let path = entry.map_err(archive_io)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let contents = std::fs::read(path).map_err(archive_io)?;
        writer
            .start_file(name, options)
            .map_err(|e| Error::Archive(format!("zip entry {}: {e}", path.display())))?;
        writer.write_all(&contents).map_err(archive_io)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| Error::Archive(format!("zip finalize: {e}")))?;

    Ok(Archive {
        bytes: cursor.into_inner(),
        entries: files.len(),
    })
}

/// Remove the directory tree and recreate it empty.
async fn purge(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::create_dir_all(dir).await
}

fn archive_io(e: std::io::Error) -> Error {
    Error::Archive(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn archives_files_flat_and_purges_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::open(tmp.path().join("photos")).unwrap();
        std::fs::write(store.dir().join("b.png"), b"png-bytes").unwrap();
        std::fs::write(store.dir().join("a.jpg"), b"jpg-bytes").unwrap();
        std::fs::create_dir(store.dir().join("subdir")).unwrap();
        std::fs::write(store.dir().join("subdir").join("hidden.jpg"), b"x").unwrap();

        let archive = take_archive(&store).await.unwrap();

        assert_eq!(archive.entries, 2);
        assert_eq!(entry_names(&archive.bytes), vec!["a.jpg", "b.png"]);

        let mut zip = zip::ZipArchive::new(Cursor::new(&archive.bytes)).unwrap();
        let mut contents = String::new();
        zip.by_name("b.png")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "png-bytes");

        assert!(store.dir().is_dir(), "directory must be recreated");
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn second_archive_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::open(tmp.path()).unwrap();
        std::fs::write(store.dir().join("only.jpg"), b"1").unwrap();

        take_archive(&store).await.unwrap();
        let second = take_archive(&store).await.unwrap();

        assert_eq!(second.entries, 0);
        assert!(entry_names(&second.bytes).is_empty());
    }

    #[test]
    fn build_fails_for_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_archive(&tmp.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), "archive");
    }

    #[tokio::test]
    async fn failed_build_leaves_directory_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::open(tmp.path()).unwrap();
        std::fs::write(store.dir().join("keep.jpg"), b"1").unwrap();

        let err = take_archive_with(&store, |_| Err(Error::Archive("disk full".into())))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "archive");
        assert_eq!(std::fs::read(store.dir().join("keep.jpg")).unwrap(), b"1");
    }
}
