// ABOUTME: Container engine access for the structured API backend.
// ABOUTME: Capability traits, the bollard implementation, and connect errors.

mod bollard;
mod error;
pub mod traits;

pub use self::bollard::{BollardRuntime, DEFAULT_TIMEOUT_SECS};
pub use error::{ConnectError, ConnectErrorKind, EngineUnreachableSnafu, SshFailureSnafu};
pub use traits::*;
