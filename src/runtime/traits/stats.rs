// ABOUTME: Stats operations trait for container runtimes.
// ABOUTME: Takes one non-streaming resource sample of a container.

use super::sealed::Sealed;
use super::shared_types::StatsSnapshot;
use crate::types::ContainerId;
use async_trait::async_trait;

#[async_trait]
pub trait StatsOps: Sealed + Send + Sync {
    /// Sample memory and CPU usage once.
    async fn stats_snapshot(&self, id: &ContainerId) -> Result<StatsSnapshot, StatsError>;
}

/// Errors from stats operations.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// The sample came back without usage figures, e.g. for a stopped container.
    #[error("no usage figures reported for container {0}")]
    Unavailable(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
