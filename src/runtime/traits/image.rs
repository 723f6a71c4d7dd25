// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: List, pull, and remove container images.

use super::sealed::Sealed;
use super::shared_types::ImageSummary;
use crate::types::ImageRef;
use async_trait::async_trait;

/// Image operations: list, pull, remove.
#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// List local images, in engine order.
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError>;

    /// Pull an image from a registry.
    async fn pull_image(&self, reference: &ImageRef) -> Result<(), ImageError>;

    /// Remove an image by id, tag, or digest.
    async fn remove_image(&self, image: &str, force: bool) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("image in use, cannot remove: {0}")]
    InUse(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
