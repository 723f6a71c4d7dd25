// ABOUTME: SSH backend configuration from dockpanel.yml and --ssh.
// ABOUTME: Parses "host", "user@host", "host:port", "user@host:port".

use super::EnvValue;
use crate::error::{Error, Result};
use crate::ssh::{
    Credential, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, HostKeyPolicy, SessionConfig,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SshConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<EnvValue>,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
    #[serde(default)]
    pub host_keys: HostKeyMode,
}

/// Host key trust as written in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyMode {
    #[default]
    AcceptAny,
    KnownHosts,
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_command_timeout() -> Duration {
    DEFAULT_COMMAND_TIMEOUT
}

impl SshConfig {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("ssh target cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user_part, rest) = match s.split_once('@') {
            Some((user, rest)) if !user.is_empty() => (Some(user), rest),
            Some(_) => return Err("ssh user cannot be empty".to_string()),
            None => (None, s),
        };

        let (host, port) = if let Some(colon_pos) = rest.rfind(':') {
            let port_str = &rest[colon_pos + 1..];
            let port = port_str
                .parse::<u16>()
                .map_err(|_| format!("invalid port: {}", port_str))?;
            (&rest[..colon_pos], port)
        } else {
            (rest, default_port())
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        Ok(SshConfig {
            host: host.to_string(),
            port,
            user: user_part.map(|s| s.to_string()),
            password: None,
            key_path: None,
            connect_timeout: default_connect_timeout(),
            command_timeout: default_command_timeout(),
            host_keys: HostKeyMode::default(),
        })
    }

    /// Replace host, port, and (when given) user from a command-line target,
    /// keeping credentials and timeouts from the file.
    pub fn retarget(mut self, target: SshConfig) -> Self {
        self.host = target.host;
        self.port = target.port;
        if target.user.is_some() {
            self.user = target.user;
        }
        self
    }

    /// Resolve credentials and build the session parameters.
    ///
    /// A password wins over a key file when both are set.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let user = self
            .user
            .clone()
            .ok_or_else(|| Error::InvalidConfig(format!("no ssh user given for {}", self.host)))?;

        let credential = match (&self.password, &self.key_path) {
            (Some(password), _) => Credential::Password(password.resolve()?),
            (None, Some(path)) => Credential::KeyFile(expand_home(path)),
            (None, None) => {
                return Err(Error::InvalidConfig(format!(
                    "no ssh password or key_path given for {}",
                    self.host
                )));
            }
        };

        let host_keys = match self.host_keys {
            HostKeyMode::AcceptAny => HostKeyPolicy::AcceptAny,
            HostKeyMode::KnownHosts => HostKeyPolicy::KnownHosts { path: None },
        };

        Ok(SessionConfig::new(&self.host, user, credential)
            .port(self.port)
            .host_keys(host_keys)
            .connect_timeout(self.connect_timeout)
            .command_timeout(self.command_timeout))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
