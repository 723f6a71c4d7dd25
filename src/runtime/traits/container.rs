// ABOUTME: Container operations trait for container runtimes.
// ABOUTME: List, create, start, stop, restart, and remove containers.

use super::sealed::Sealed;
use super::shared_types::{ContainerSummary, RunConfig};
use crate::types::ContainerId;
use async_trait::async_trait;
use std::time::Duration;

/// Container lifecycle operations.
#[async_trait]
pub trait ContainerOps: Sealed + Send + Sync {
    /// List containers matching the given filters, in engine order.
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError>;

    /// Create a container without starting it.
    async fn create_container(&self, config: &RunConfig) -> Result<ContainerId, ContainerError>;

    /// Start a created or stopped container.
    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError>;

    /// Stop a running container. `None` uses the engine's default grace period.
    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Option<Duration>,
    ) -> Result<(), ContainerError>;

    /// Restart a container.
    async fn restart_container(&self, id: &ContainerId) -> Result<(), ContainerError>;

    /// Remove a container; `force` kills it first if running.
    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError>;
}

/// Engine-side filters for listing containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerFilters {
    /// Include stopped containers.
    pub all: bool,
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("container not running: {0}")]
    NotRunning(String),

    #[error("container already running: {0}")]
    AlreadyRunning(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
