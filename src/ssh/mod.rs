// ABOUTME: SSH client module for the remote shell backend.
// ABOUTME: Password or key authentication, one session per command.

mod client;
mod error;
mod remote;

pub use client::{
    CommandOutput, Credential, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, HostKeyPolicy,
    Session, SessionConfig,
};
pub use error::{Error, Result};
pub use remote::{CONNECTION_ERROR_PREFIX, execute_remote, run_remote};
