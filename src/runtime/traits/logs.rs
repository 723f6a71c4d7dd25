// ABOUTME: Log operations trait for container runtimes.
// ABOUTME: Fetches a fixed-size tail of a container's combined output.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

pub type LogLineStream = Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>;

/// Log fetch operations.
#[async_trait]
pub trait LogOps: Sealed + Send + Sync {
    /// Read log chunks from a container. The stream ends once the
    /// requested tail has been delivered.
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogLineStream, LogError>;

    /// Collect the last `lines` lines of stdout and stderr as text.
    async fn tail_logs(&self, id: &ContainerId, lines: u64) -> Result<String, LogError> {
        let mut stream = self.container_logs(id, &LogOptions::tail(lines)).await?;
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk?.content);
        }
        Ok(text)
    }
}

/// Options for a log fetch.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Number of lines to show from end (`None` = all).
    pub tail: Option<u64>,
}

impl LogOptions {
    /// Create options for the last N lines of both streams.
    pub fn tail(n: u64) -> Self {
        Self {
            stdout: true,
            stderr: true,
            tail: Some(n),
        }
    }
}

/// A chunk of log output from a container.
#[derive(Debug, Clone)]
pub struct LogLine {
    /// The log content, including its trailing newline.
    pub content: String,
    /// Whether this is from stdout or stderr.
    pub stream: LogStream,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),
}
