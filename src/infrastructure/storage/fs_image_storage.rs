use crate::application::ports::image_storage::ImageStorage;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Post images stored as plain files below `root`.
pub struct FsImageStorage {
    root: PathBuf,
}

impl FsImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(AppError::InvalidInput(format!("Invalid image path: {path}")));
        }
        Ok(self.root.join(relative))
    }

    pub async fn put_image(&self, path: &str, bytes: &[u8]) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(())
    }

    pub async fn exists(&self, path: &str) -> Result<bool, AppError> {
        let target = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&target).await?)
    }
}

#[async_trait]
impl ImageStorage for FsImageStorage {
    async fn delete_image(&self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        tokio::fs::remove_file(&target).await?;
        debug!(path = %path, "image deleted");
        Ok(())
    }
}
