//! Server-side storage directory.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};

/// The directory uploads are stored in and downloads are served from.
///
/// Contents are read at request time; there is no snapshot isolation between
/// concurrent sessions. Uploads use create-exclusive opens so two `put`s of
/// the same name cannot both succeed.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the storage root, and any missing parents, if absent.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates `name` for writing, failing with `AlreadyExists` if it is
    /// already present.
    pub async fn create_exclusive(&self, name: &str) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_for(name))
            .await
    }

    /// Returns the path of `name` if it exists as a regular file.
    pub async fn find_file(&self, name: &str) -> Option<PathBuf> {
        let path = self.path_for(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    /// Names of every entry in the storage root, sorted.
    pub async fn list(&self) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }
}
