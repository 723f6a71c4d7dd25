// ABOUTME: One-shot remote command execution over a fresh SSH session.
// ABOUTME: Each call connects, runs a single command line, and disconnects.

use super::client::{CommandOutput, Session, SessionConfig};
use super::error::Result;

/// Prefix of the text `execute_remote` returns when no command output exists.
pub const CONNECTION_ERROR_PREFIX: &str = "SSH connection error";

/// Run one command in a new session and return its split output.
///
/// The session is closed afterwards whether or not the command succeeded;
/// a failed disconnect is logged and does not affect the result.
pub async fn run_remote(config: &SessionConfig, command: &str) -> Result<CommandOutput> {
    let session = Session::connect(config.clone()).await?;
    tracing::debug!("running remote command on {}: {}", config.target(), command);

    let result = session.exec(command).await;

    if let Err(e) = session.disconnect().await {
        tracing::warn!("SSH disconnect failed for {}: {}", config.target(), e);
    }

    result
}

/// Run one command and fold everything into a single string.
///
/// Returns stdout when non-empty, otherwise stderr, otherwise (when the
/// session or command failed) a message starting with
/// [`CONNECTION_ERROR_PREFIX`]. Never fails.
pub async fn execute_remote(config: &SessionConfig, command: &str) -> String {
    match run_remote(config, command).await {
        Ok(output) => output.combined(),
        Err(e) => format!("{CONNECTION_ERROR_PREFIX}: {e}"),
    }
}
