// ABOUTME: Runtime info trait for container runtimes.
// ABOUTME: Checks that an engine answers before a client is cached.

use super::sealed::Sealed;
use async_trait::async_trait;

/// Engine liveness.
#[async_trait]
pub trait RuntimeInfo: Sealed + Send + Sync {
    /// Ping the engine to check connectivity.
    async fn ping(&self) -> Result<(), RuntimeInfoError>;
}

/// Errors from runtime info operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeInfoError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
