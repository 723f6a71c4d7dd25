// ABOUTME: Operation dispatcher routing intents to the active backend.
// ABOUTME: Enforces the connected gate and the per-backend capability split.

mod engine;
mod filter;
mod intent;
mod outcome;

pub use filter::{filter_containers, filter_images};
pub use intent::{DEFAULT_LOG_LINES, Intent};
pub use outcome::{OperationError, OperationErrorKind, OperationResult, Payload};

use crate::connector::{Backend, Connection, Connector};
use crate::runtime::ConnectError;
use crate::ssh::{CONNECTION_ERROR_PREFIX, SessionConfig};
use std::sync::Arc;

/// Command the shell backend runs to show remote containers.
pub const SHELL_PROBE_COMMAND: &str = "docker ps -a";

/// Holds at most one active connection and runs intents against it.
///
/// Intents run one at a time; each call returns only after the backend has
/// answered or failed.
pub struct Dispatcher {
    connector: Connector,
    connection: Option<Connection>,
}

impl Dispatcher {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            connection: None,
        }
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Connect to an engine endpoint, reusing a cached client for the same URI.
    ///
    /// On failure the dispatcher is left disconnected.
    pub async fn connect_tcp(&mut self, uri: &str) -> Result<(), ConnectError> {
        self.connection = None;
        let runtime = self.connector.connect_tcp(uri).await?;
        self.connection = Some(Connection::TcpApi(runtime));
        Ok(())
    }

    /// Verify SSH parameters and switch to the shell backend.
    ///
    /// On failure the dispatcher is left disconnected.
    pub async fn connect_shell(&mut self, config: SessionConfig) -> Result<(), ConnectError> {
        self.connection = None;
        let session = self.connector.connect_shell(config).await?;
        self.connection = Some(Connection::Shell(session));
        Ok(())
    }

    /// Use an already established connection.
    pub fn attach(&mut self, connection: Connection) {
        self.connection = Some(connection);
    }

    pub fn disconnect(&mut self) {
        self.connection = None;
    }

    /// Run one intent against the active connection.
    pub async fn dispatch(&self, intent: Intent) -> OperationResult {
        let connection = self
            .connection
            .as_ref()
            .ok_or(OperationError::NotConnected)?;

        tracing::debug!(
            intent = intent.name(),
            backend = %connection.backend(),
            "dispatching intent"
        );

        let backend = connection.backend();
        let result = match (connection, intent) {
            (Connection::Shell(shell), Intent::RemoteCommand { command }) => shell
                .run(&command)
                .await
                .map(|output| Payload::Text(output.combined()))
                .map_err(|e| OperationError::EngineOperationFailed {
                    intent: "remote command",
                    message: format!("{CONNECTION_ERROR_PREFIX}: {e}"),
                }),
            (Connection::TcpApi(engine), intent) if intent.backend() == Backend::TcpApi => {
                engine::perform(Arc::as_ref(engine), intent).await
            }
            (_, intent) => Err(OperationError::UnsupportedByBackend {
                intent: intent.name(),
                backend,
            }),
        };

        if let Err(ref e) = result {
            tracing::debug!("intent failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests;
