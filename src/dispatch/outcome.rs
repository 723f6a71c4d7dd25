// ABOUTME: Normalized results of dispatched intents.
// ABOUTME: A payload on success, a descriptive OperationError otherwise.

use crate::connector::Backend;
use crate::runtime::{ContainerSummary, ImageSummary, StatsSnapshot};
use crate::types::ContainerId;
use serde::Serialize;

/// Outcome of one dispatched intent. Exactly one of payload or error exists.
pub type OperationResult = Result<Payload, OperationError>;

/// Successful result data, renderable as text or a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Containers(Vec<ContainerSummary>),
    Images(Vec<ImageSummary>),
    /// A state change the engine accepted.
    Done(String),
    /// A container created and started by `create and run`.
    Created { id: ContainerId, short_id: String },
    Stats(StatsSnapshot),
    /// Log text, exec output, or remote command output.
    Text(String),
}

/// Why an intent produced no payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("not connected: connect to a Docker engine or SSH host first")]
    NotConnected,

    #[error("{intent} is not supported over the {backend} backend")]
    UnsupportedByBackend {
        intent: &'static str,
        backend: Backend,
    },

    #[error("{intent} failed: {message}")]
    EngineOperationFailed {
        intent: &'static str,
        message: String,
    },

    #[error("invalid input for {intent}: {message}")]
    InvalidInput {
        intent: &'static str,
        message: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationErrorKind {
    NotConnected,
    UnsupportedByBackend,
    EngineOperationFailed,
    InvalidInput,
}

impl OperationError {
    pub fn kind(&self) -> OperationErrorKind {
        match self {
            OperationError::NotConnected => OperationErrorKind::NotConnected,
            OperationError::UnsupportedByBackend { .. } => OperationErrorKind::UnsupportedByBackend,
            OperationError::EngineOperationFailed { .. } => {
                OperationErrorKind::EngineOperationFailed
            }
            OperationError::InvalidInput { .. } => OperationErrorKind::InvalidInput,
        }
    }

    pub(crate) fn failed(intent: &'static str) -> impl Fn(String) -> OperationError {
        move |message| OperationError::EngineOperationFailed { intent, message }
    }

    pub(crate) fn invalid(intent: &'static str, message: impl Into<String>) -> OperationError {
        OperationError::InvalidInput {
            intent,
            message: message.into(),
        }
    }
}
