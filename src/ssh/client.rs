// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection, password/key authentication, and command execution.

use super::error::{Error, Result};
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{check_known_hosts, check_known_hosts_path};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{ChannelMsg, Disconnect};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default limit for TCP connect plus authentication.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default limit for a single remote command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// How the session proves the user's identity.
#[derive(Clone)]
pub enum Credential {
    Password(String),
    KeyFile(PathBuf),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Password(<redacted>)"),
            Credential::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// How unknown or changed server host keys are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept any host key without checking or recording it.
    ///
    /// This is the panel's default: it talks to hosts the operator names
    /// explicitly, and the relaxed trust is logged on every connection.
    #[default]
    AcceptAny,
    /// Require the key to be present in a known_hosts file
    /// (`~/.ssh/known_hosts` when `path` is `None`).
    KnownHosts { path: Option<PathBuf> },
}

/// Configuration for establishing an SSH session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Password or private key.
    pub credential: Credential,
    /// Host key verification policy.
    pub host_keys: HostKeyPolicy,
    /// Limit for connecting and authenticating (default: 10 seconds).
    pub connect_timeout: Duration,
    /// Limit for each command (default: 5 minutes).
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>, credential: Credential) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            credential,
            host_keys: HostKeyPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host_keys(mut self, policy: HostKeyPolicy) -> Self {
        self.host_keys = policy;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// `user@host:port`, for log lines and error messages.
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Output from a remote command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: u32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout when the command printed anything there, stderr otherwise.
    pub fn combined(self) -> String {
        if self.stdout.is_empty() {
            self.stderr
        } else {
            self.stdout
        }
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match &self.policy {
            HostKeyPolicy::AcceptAny => {
                tracing::warn!(
                    "accepting host key for {}:{} without verification",
                    self.host,
                    self.port
                );
                Ok(true)
            }
            HostKeyPolicy::KnownHosts { path } => {
                let check_result = match path {
                    Some(path) => {
                        check_known_hosts_path(&self.host, self.port, server_public_key, path)
                    }
                    None => check_known_hosts(&self.host, self.port, server_public_key),
                };
                match check_result {
                    Ok(known) => Ok(known),
                    Err(e) => {
                        tracing::warn!(
                            "host key check failed for {}:{}: {}",
                            self.host,
                            self.port,
                            e
                        );
                        Ok(false)
                    }
                }
            }
        }
    }
}

/// An established, authenticated SSH session.
pub struct Session {
    config: SessionConfig,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Session {
    /// Connect and authenticate, bounded by the configured connect timeout.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let timeout = config.connect_timeout;
        match tokio::time::timeout(timeout, Self::connect_inner(config)).await {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectTimeout(timeout)),
        }
    }

    async fn connect_inner(config: SessionConfig) -> Result<Self> {
        let russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            policy: config.host_keys.clone(),
        };

        let mut handle = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        )
        .await
        .map_err(|e| {
            if e.to_string().contains("Connection refused") {
                Error::Connection(format!(
                    "connection refused to {}:{}",
                    config.host, config.port
                ))
            } else {
                Error::Connection(e.to_string())
            }
        })?;

        if !Self::authenticate(&mut handle, &config).await? {
            return Err(Error::AuthenticationFailed);
        }

        tracing::debug!("SSH session established to {}", config.target());
        Ok(Self { config, handle })
    }

    async fn authenticate(handle: &mut Handle<SshHandler>, config: &SessionConfig) -> Result<bool> {
        match &config.credential {
            Credential::Password(password) => {
                let result = handle
                    .authenticate_password(&config.user, password)
                    .await
                    .map_err(Error::Protocol)?;
                Ok(result.success())
            }
            Credential::KeyFile(key_path) => {
                let key = load_secret_key(key_path, None).map_err(|e| Error::KeyLoadFailed {
                    path: key_path.clone(),
                    reason: e.to_string(),
                })?;

                let hash_alg = handle
                    .best_supported_rsa_hash()
                    .await
                    .map_err(Error::Protocol)?
                    .flatten();

                let result = handle
                    .authenticate_publickey(
                        &config.user,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(Error::Protocol)?;

                Ok(result.success())
            }
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Execute a command on the remote host, bounded by the command timeout.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        let timeout = self.config.command_timeout;
        match tokio::time::timeout(timeout, self.exec_inner(command)).await {
            Ok(result) => result,
            Err(_) => Err(Error::CommandTimeout(timeout)),
        }
    }

    async fn exec_inner(&self, command: &str) -> Result<CommandOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;
        let mut got_eof = false;

        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                // Extended data type 1 is stderr
                Some(ChannelMsg::ExtendedData { data, ext: 1 }) => {
                    stderr.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    exit_code = Some(exit_status);
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::Eof) => {
                    got_eof = true;
                    if exit_code.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }

        // No exit status means the channel died mid-command.
        let exit_code = exit_code.ok_or(Error::ChannelClosed)?;

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        Ok(())
    }
}
