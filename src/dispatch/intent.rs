// ABOUTME: Logical operations a caller can request of a backend.
// ABOUTME: Each intent names the backend that can serve it.

use crate::connector::Backend;
use crate::types::ContainerId;

/// Lines returned by a log tail when the caller does not choose.
pub const DEFAULT_LOG_LINES: u64 = 50;

/// One user-triggered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ListContainers {
        /// Case-insensitive substring of the container name; empty matches all.
        filter: String,
        include_stopped: bool,
    },
    Start {
        id: ContainerId,
    },
    Stop {
        id: ContainerId,
    },
    Restart {
        id: ContainerId,
    },
    Remove {
        id: ContainerId,
        force: bool,
    },
    CreateAndRun {
        image: String,
        /// Command line; `None` or blank runs the image's default command.
        command: Option<String>,
    },
    ListImages {
        /// Case-sensitive substring of any tag; empty matches all.
        filter: String,
    },
    PullImage {
        reference: String,
    },
    RemoveImage {
        /// Image id, short id, or tag.
        image: String,
        force: bool,
    },
    FetchStats {
        id: ContainerId,
    },
    TailLogs {
        id: ContainerId,
        lines: u64,
    },
    ExecInContainer {
        id: ContainerId,
        command: String,
    },
    /// Arbitrary command line for the remote shell.
    RemoteCommand {
        command: String,
    },
}

impl Intent {
    /// List containers including stopped ones.
    pub fn list_containers(filter: impl Into<String>) -> Self {
        Intent::ListContainers {
            filter: filter.into(),
            include_stopped: true,
        }
    }

    /// Force-remove a container.
    pub fn remove(id: ContainerId) -> Self {
        Intent::Remove { id, force: true }
    }

    /// Force-remove an image.
    pub fn remove_image(image: impl Into<String>) -> Self {
        Intent::RemoveImage {
            image: image.into(),
            force: true,
        }
    }

    /// Tail the default number of log lines.
    pub fn tail_logs(id: ContainerId) -> Self {
        Intent::TailLogs {
            id,
            lines: DEFAULT_LOG_LINES,
        }
    }

    /// Short human name, used in log lines and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::ListContainers { .. } => "list containers",
            Intent::Start { .. } => "start",
            Intent::Stop { .. } => "stop",
            Intent::Restart { .. } => "restart",
            Intent::Remove { .. } => "remove",
            Intent::CreateAndRun { .. } => "create and run",
            Intent::ListImages { .. } => "list images",
            Intent::PullImage { .. } => "pull image",
            Intent::RemoveImage { .. } => "remove image",
            Intent::FetchStats { .. } => "fetch stats",
            Intent::TailLogs { .. } => "tail logs",
            Intent::ExecInContainer { .. } => "exec",
            Intent::RemoteCommand { .. } => "remote command",
        }
    }

    /// The only backend able to serve this intent.
    pub fn backend(&self) -> Backend {
        match self {
            Intent::RemoteCommand { .. } => Backend::Shell,
            _ => Backend::TcpApi,
        }
    }

    /// Whether a successful run changes engine state, so listings should be re-read.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Intent::Start { .. }
                | Intent::Stop { .. }
                | Intent::Restart { .. }
                | Intent::Remove { .. }
                | Intent::CreateAndRun { .. }
                | Intent::PullImage { .. }
                | Intent::RemoveImage { .. }
        )
    }
}
