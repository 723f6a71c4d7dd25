// ABOUTME: Backend connector producing engine or shell connections.
// ABOUTME: Memoizes engine clients per URI with explicit invalidation.

use crate::runtime::{
    BollardRuntime, ConnectError, DEFAULT_TIMEOUT_SECS, Engine, EngineUnreachableSnafu,
    RuntimeInfo, SshFailureSnafu,
};
use crate::ssh::{self, CommandOutput, Session, SessionConfig};
use parking_lot::Mutex;
use snafu::ResultExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default engine endpoint.
pub const DEFAULT_ENGINE_URI: &str = "tcp://localhost:2375";

/// The active backend of a dispatcher.
#[derive(Clone)]
pub enum Connection {
    /// Structured Engine API client.
    TcpApi(Arc<dyn Engine>),
    /// Validated SSH parameters; each command opens its own session.
    Shell(ShellSession),
}

impl Connection {
    pub fn backend(&self) -> Backend {
        match self {
            Connection::TcpApi(_) => Backend::TcpApi,
            Connection::Shell(_) => Backend::Shell,
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connection::TcpApi(_) => f.write_str("TcpApi(<engine>)"),
            Connection::Shell(session) => f.debug_tuple("Shell").field(session).finish(),
        }
    }
}

/// Which transport a connection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    TcpApi,
    Shell,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::TcpApi => write!(f, "engine API"),
            Backend::Shell => write!(f, "SSH shell"),
        }
    }
}

/// SSH parameters that have completed one successful handshake.
///
/// Sessions are not pooled: every command connects afresh.
#[derive(Debug, Clone)]
pub struct ShellSession {
    config: SessionConfig,
}

impl ShellSession {
    pub(crate) fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run a command and return stdout, else stderr, else a connection error message.
    pub async fn execute(&self, command: &str) -> String {
        ssh::execute_remote(&self.config, command).await
    }

    /// Run a command keeping exit code and both streams.
    pub async fn run(&self, command: &str) -> ssh::Result<CommandOutput> {
        ssh::run_remote(&self.config, command).await
    }
}

/// Produces connections and owns the engine client cache.
pub struct Connector {
    timeout: Duration,
    engines: Mutex<HashMap<String, Arc<BollardRuntime>>>,
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl Connector {
    /// Create a connector whose engine clients use `timeout` per request.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached client for `uri`, or build one and ping it.
    ///
    /// Only clients whose ping succeeded are cached. The same URI string
    /// always yields the same `Arc` until it is invalidated.
    pub async fn connect_tcp(&self, uri: &str) -> Result<Arc<BollardRuntime>, ConnectError> {
        if let Some(cached) = self.engines.lock().get(uri).cloned() {
            tracing::debug!("reusing engine connection for {}", uri);
            return Ok(cached);
        }

        let runtime =
            BollardRuntime::connect_tcp(uri, self.timeout).context(EngineUnreachableSnafu { uri })?;
        runtime
            .ping()
            .await
            .context(EngineUnreachableSnafu { uri })?;

        tracing::info!("connected to Docker engine at {}", uri);
        Ok(self.remember(uri, runtime))
    }

    /// Cache a client under `uri`, keeping an existing entry if one appeared meanwhile.
    pub(crate) fn remember(&self, uri: &str, runtime: BollardRuntime) -> Arc<BollardRuntime> {
        self.engines
            .lock()
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(runtime))
            .clone()
    }

    /// Drop the cached client for `uri`. Returns whether one was cached.
    pub fn invalidate(&self, uri: &str) -> bool {
        self.engines.lock().remove(uri).is_some()
    }

    /// Drop every cached client.
    pub fn clear(&self) {
        self.engines.lock().clear();
    }

    /// URIs with a cached client, sorted.
    pub fn cached_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.engines.lock().keys().cloned().collect();
        uris.sort();
        uris
    }

    /// Verify SSH parameters with one connect-authenticate-disconnect cycle.
    pub async fn connect_shell(&self, config: SessionConfig) -> Result<ShellSession, ConnectError> {
        let host = config.host.clone();
        let session = Session::connect(config.clone())
            .await
            .context(SshFailureSnafu { host })?;

        if let Err(e) = session.disconnect().await {
            tracing::warn!("SSH disconnect failed for {}: {}", config.target(), e);
        }

        Ok(ShellSession::new(config))
    }
}
