// ABOUTME: Sealed trait pattern for runtime traits.
// ABOUTME: Keeps engine capability traits implementable only inside this crate.

/// Sealed trait to prevent external implementations.
///
/// Only types inside this crate (the bollard runtime and test doubles) can
/// implement the capability traits, so methods can be added without a
/// breaking change.
pub trait Sealed {}
