//! Local filesystem storage for uploaded photos
//!
//! Files live flat under a single root directory and are addressed by their
//! stored name. Every name passes through [`sanitize_filename`] before it is
//! joined to the root, so callers cannot escape the directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::{FilenamePolicy, MediaConfig};
use crate::core::error::Result;
use crate::shared::validation::sanitize_filename;

pub struct LocalMediaStore {
    root: PathBuf,
    filename_policy: FilenamePolicy,
}

impl LocalMediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.upload_dir.clone(),
            filename_policy: config.filename_policy,
        }
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        info!("Media store ready at {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name under which an upload with the given client filename is stored
    pub fn storage_name(&self, original_filename: &str) -> String {
        let sanitized = sanitize_filename(original_filename);
        match self.filename_policy {
            FilenamePolicy::Unique => format!("{}_{}", Uuid::now_v7().simple(), sanitized),
            FilenamePolicy::Preserve => sanitized,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(sanitize_filename(name))
    }

    /// Write a file, replacing any existing file with the same name
    pub async fn save(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(name);
        tokio::fs::write(&path, data).await?;
        debug!("Saved {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    /// Read a stored file; `None` when it does not exist
    #[cfg(test)]
    pub async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(name)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file. Returns whether a file was actually removed;
    /// a missing file is not an error.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path, policy: FilenamePolicy) -> LocalMediaStore {
        LocalMediaStore::new(&MediaConfig {
            upload_dir: dir.to_path_buf(),
            filename_policy: policy,
        })
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), FilenamePolicy::Preserve);

        store.save("bin.jpg", b"jpeg-bytes").await.unwrap();
        assert_eq!(
            store.read("bin.jpg").await.unwrap(),
            Some(b"jpeg-bytes".to_vec())
        );

        assert!(store.delete("bin.jpg").await.unwrap());
        assert_eq!(store.read("bin.jpg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), FilenamePolicy::Preserve);

        assert!(!store.delete("never-saved.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_preserve_policy_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), FilenamePolicy::Preserve);

        let first = store.storage_name("dump site.jpg");
        let second = store.storage_name("dump site.jpg");
        assert_eq!(first, "dump_site.jpg");
        assert_eq!(first, second);

        store.save(&first, b"one").await.unwrap();
        store.save(&second, b"two").await.unwrap();
        assert_eq!(store.read(&first).await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_unique_policy_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), FilenamePolicy::Unique);

        let first = store.storage_name("dump site.jpg");
        let second = store.storage_name("dump site.jpg");
        assert_ne!(first, second);
        assert!(first.ends_with("_dump_site.jpg"));
        assert_eq!(sanitize_filename(&first), first);
    }

    #[test]
    fn test_path_for_stays_inside_root() {
        let store = store(Path::new("/srv/uploads"), FilenamePolicy::Preserve);
        assert_eq!(
            store.path_for("../../etc/passwd"),
            PathBuf::from("/srv/uploads/etc_passwd")
        );
    }

    #[tokio::test]
    async fn test_ensure_root_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("uploads");
        let store = store(&nested, FilenamePolicy::Unique);

        store.ensure_root().await.unwrap();
        assert!(store.root().is_dir());
    }
}
