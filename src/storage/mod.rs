/// Image file cleanup
///
/// The upload collaborator persists post images under the public root and
/// hands their references to the handlers. This module owns the other half of
/// that contract: deleting staged or orphaned files when a mutation removes
/// their references. Removal is strictly best-effort - a failed unlink is
/// logged and never rolls back the data mutation that triggered it.
use async_trait::async_trait;
use std::path::PathBuf;

/// Directory (under the public root) the upload collaborator writes post
/// images into. References stored on posts are relative to the public root.
pub const POST_IMAGE_PATH: &str = "uploads/postImages";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Removes a stored image by its reference. Never fails.
    async fn remove(&self, reference: &str);
}

/// Filesystem-backed image store rooted at the configured public directory
pub struct FsImageStore {
    public_root: PathBuf,
}

impl FsImageStore {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn remove(&self, reference: &str) {
        let path = self.public_root.join(reference);
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), "Error while deleting image: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join(POST_IMAGE_PATH);
        std::fs::create_dir_all(&sub).unwrap();
        let file = sub.join("postImage-1.png");
        std::fs::write(&file, b"png").unwrap();

        let store = FsImageStore::new(dir.path());
        store
            .remove(&format!("{POST_IMAGE_PATH}/postImage-1.png"))
            .await;

        assert!(!file.exists());
    }

    #[tokio::test]
    async fn missing_file_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());

        // No panic, no error surface
        store
            .remove(&format!("{POST_IMAGE_PATH}/never-existed.png"))
            .await;
    }
}
