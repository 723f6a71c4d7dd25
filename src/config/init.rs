// ABOUTME: Config scaffolding for new panels.
// ABOUTME: Creates a commented dockpanel.yml template.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const TEMPLATE: &str = r#"# dockpanel configuration. Every section is optional.
engine:
  uri: tcp://localhost:2375
  timeout: 120s

# Remote shell backend, used by `dockpanel --ssh` and `ssh-test`.
# ssh:
#   host: server.example.com
#   port: 22
#   user: ops
#   password: { env: DOCKPANEL_SSH_PASSWORD }
#   # key_path: ~/.ssh/id_ed25519
#   connect_timeout: 10s
#   command_timeout: 5m
#   # Host keys are accepted without checking unless set to known-hosts.
#   host_keys: accept-any

defaults:
  log_tail: 50
  run_image: alpine:latest
  run_command: echo Hello from Docker
  pull_image: nginx:latest
"#;

/// Write the template into `dir`, returning the path written.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn template_parses_to_defaults() {
        let config = Config::from_yaml(TEMPLATE).unwrap();
        assert_eq!(config.engine.uri, "tcp://localhost:2375");
        assert!(config.ssh.is_none());
        assert_eq!(config.defaults.log_tail, 50);
    }
}
