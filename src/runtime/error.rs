// ABOUTME: Connection error types with SNAFU pattern.
// ABOUTME: Unifies engine and SSH connect failures for programmatic handling.

use snafu::Snafu;

use super::traits::RuntimeInfoError;

/// Failure to establish a backend connection.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConnectError {
    #[snafu(display("failed to connect to Docker engine at {uri}: {source}"))]
    EngineUnreachable {
        uri: String,
        source: RuntimeInfoError,
    },

    #[snafu(display("SSH connection to {host} failed: {source}"))]
    SshFailure {
        host: String,
        source: crate::ssh::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// The engine endpoint could not be built or did not answer the ping.
    EngineUnreachable,
    /// The SSH handshake or authentication failed.
    SshFailure,
}

impl ConnectError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ConnectErrorKind {
        match self {
            ConnectError::EngineUnreachable { .. } => ConnectErrorKind::EngineUnreachable,
            ConnectError::SshFailure { .. } => ConnectErrorKind::SshFailure,
        }
    }

    /// The endpoint or host the failed attempt targeted.
    pub fn target(&self) -> &str {
        match self {
            ConnectError::EngineUnreachable { uri, .. } => uri,
            ConnectError::SshFailure { host, .. } => host,
        }
    }
}
