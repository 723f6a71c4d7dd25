// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: Container/image snapshots, stats, run and exec configuration.

use crate::types::{ContainerId, ImageId, ImageRef};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of a container, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSummary {
    /// Full container ID.
    pub id: ContainerId,
    /// Twelve-character short ID.
    pub short_id: String,
    /// Container name without the leading slash.
    pub name: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Tags of the container's image (empty for dangling or removed images).
    pub image_tags: Vec<String>,
    /// Engine state, e.g. `running` or `exited`.
    pub status: String,
    /// Human status line, e.g. `Up 2 minutes`.
    pub status_text: String,
    /// Creation time, when the engine reports it.
    pub created: Option<DateTime<Utc>>,
}

/// Point-in-time view of a local image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    /// Full image ID (`sha256:...`).
    pub id: ImageId,
    /// `sha256:` plus ten hex characters.
    pub short_id: String,
    /// Repository tags, excluding `<none>:<none>`.
    pub tags: Vec<String>,
    /// Size in bytes.
    pub size: i64,
    pub created: Option<DateTime<Utc>>,
}

impl ImageSummary {
    /// Whether any tag contains `needle`. Matching is case-sensitive.
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags.iter().any(|tag| tag.contains(needle))
    }
}

/// One non-streaming resource sample for a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Memory usage in MiB (bytes / 2^20).
    pub memory_mb: f64,
    /// Cumulative CPU time reported by the engine, in its native units.
    pub cpu_total_usage: u64,
}

impl StatsSnapshot {
    pub fn from_raw(memory_bytes: u64, cpu_total_usage: u64) -> Self {
        Self {
            memory_mb: memory_bytes as f64 / (1u64 << 20) as f64,
            cpu_total_usage,
        }
    }
}

/// Configuration for creating a detached container.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Image to run.
    pub image: ImageRef,
    /// Command to run; `None` keeps the image's default CMD.
    pub command: Option<Vec<String>>,
}

impl RunConfig {
    pub fn new(image: ImageRef) -> Self {
        Self {
            image,
            command: None,
        }
    }

    pub fn command(mut self, command: Vec<String>) -> Self {
        self.command = Some(command);
        self
    }
}

/// Exec configuration for running commands in containers.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Command and arguments to run.
    pub cmd: Vec<String>,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    /// Allocate a TTY.
    pub tty: bool,
}

impl ExecConfig {
    pub fn command(cmd: Vec<String>) -> Self {
        Self {
            cmd,
            ..Default::default()
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            cmd: Vec::new(),
            attach_stdout: true,
            attach_stderr: true,
            tty: false,
        }
    }
}

/// Result of an exec operation.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Exit code.
    pub exit_code: i64,
    /// Standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: Vec<u8>,
}

impl ExecResult {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}
