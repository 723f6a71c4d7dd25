// ABOUTME: Configuration types and parsing for dockpanel.yml.
// ABOUTME: Handles YAML parsing, discovery, and defaults for every section.

mod deserialize;
mod env_value;
mod init;
mod ssh;

pub use env_value::EnvValue;
pub use init::init_config;
pub use ssh::{HostKeyMode, SshConfig};

use crate::connector::DEFAULT_ENGINE_URI;
use crate::dispatch::DEFAULT_LOG_LINES;
use crate::error::{Error, Result};
use crate::runtime::DEFAULT_TIMEOUT_SECS;
use deserialize::{deserialize_image_ref, deserialize_ssh};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "dockpanel.yml";
pub const CONFIG_FILENAME_ALT: &str = "dockpanel.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dockpanel/config.yml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default, deserialize_with = "deserialize_ssh")]
    pub ssh: Option<SshConfig>,

    #[serde(default)]
    pub defaults: Defaults,
}

/// Engine API endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_uri")]
    pub uri: String,

    /// Per-request timeout for the engine client.
    #[serde(default = "default_engine_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            uri: default_engine_uri(),
            timeout: default_engine_timeout(),
        }
    }
}

fn default_engine_uri() -> String {
    DEFAULT_ENGINE_URI.to_string()
}

fn default_engine_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

/// Values the CLI fills in when an argument is omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_log_tail")]
    pub log_tail: u64,

    #[serde(default = "default_run_image", deserialize_with = "deserialize_image_ref")]
    pub run_image: String,

    #[serde(default = "default_run_command")]
    pub run_command: String,

    #[serde(default = "default_pull_image", deserialize_with = "deserialize_image_ref")]
    pub pull_image: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            log_tail: default_log_tail(),
            run_image: default_run_image(),
            run_command: default_run_command(),
            pull_image: default_pull_image(),
        }
    }
}

fn default_log_tail() -> u64 {
    DEFAULT_LOG_LINES
}

fn default_run_image() -> String {
    "alpine:latest".to_string()
}

fn default_run_command() -> String {
    "echo Hello from Docker".to_string()
}

fn default_pull_image() -> String {
    "nginx:latest".to_string()
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file parses as YAML null.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but every section falls back to its
    /// defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }
}
