//! Object store collaborator: existence checks for uploaded documents.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::StorageError;
use crate::models::receipt::ObjectLocation;

/// Metadata returned by a successful existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
}

/// Trait for object stores holding uploaded receipt images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check that the object exists and can be read.
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMeta, StorageError>;
}

/// Object store backed by a local directory; buckets are subdirectories.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMeta, StorageError> {
        let inaccessible = |reason: String| {
            error!("Object verification failed: {}", reason);
            StorageError::Inaccessible {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason,
            }
        };

        let path = object_path(&self.root, location)
            .ok_or_else(|| inaccessible("key escapes the bucket".to_string()))?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| inaccessible(e.to_string()))?;

        if !metadata.is_file() {
            return Err(inaccessible("not a regular file".to_string()));
        }

        info!("Object verification successful: {}", location);
        Ok(ObjectMeta {
            size: metadata.len(),
        })
    }
}

/// Resolve `root/bucket/key`, refusing bucket or key components that would
/// leave the root.
pub(crate) fn object_path(root: &Path, location: &ObjectLocation) -> Option<PathBuf> {
    let bucket = Path::new(&location.bucket);
    let key = Path::new(&location.key);

    let is_plain = |p: &Path| {
        p.components().all(|c| matches!(c, Component::Normal(_)))
            && p.components().next().is_some()
    };

    if !is_plain(bucket) || bucket.components().count() != 1 || !is_plain(key) {
        return None;
    }

    Some(root.join(bucket).join(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_path_rejects_traversal() {
        let root = Path::new("/data");

        assert_eq!(
            object_path(root, &ObjectLocation::new("b", "uploads/r.jpg")),
            Some(PathBuf::from("/data/b/uploads/r.jpg"))
        );
        assert_eq!(object_path(root, &ObjectLocation::new("b", "../x.jpg")), None);
        assert_eq!(object_path(root, &ObjectLocation::new("b", "/etc/passwd")), None);
        assert_eq!(object_path(root, &ObjectLocation::new("a/b", "x.jpg")), None);
        assert_eq!(object_path(root, &ObjectLocation::new("b", "")), None);
    }

    #[tokio::test]
    async fn test_head_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("receipts")).unwrap();
        std::fs::write(dir.path().join("receipts/r 1.jpg"), b"jpeg").unwrap();

        let store = LocalObjectStore::new(dir.path());
        let meta = store
            .head_object(&ObjectLocation::new("receipts", "r 1.jpg"))
            .await
            .unwrap();

        assert_eq!(meta.size, 4);
    }

    #[tokio::test]
    async fn test_head_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let err = store
            .head_object(&ObjectLocation::new("receipts", "missing.jpg"))
            .await
            .unwrap_err();

        assert!(
            err.to_string()
                .starts_with("Unable to access object missing.jpg in bucket receipts:")
        );
    }
}
