use crate::shared::error::AppError;
use async_trait::async_trait;

/// Hosted post images, addressed by `posts/{postId}/image`.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn delete_image(&self, path: &str) -> Result<(), AppError>;
}

pub fn post_image_path(post_id: &str) -> String {
    format!("posts/{post_id}/image")
}
