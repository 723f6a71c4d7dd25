// ABOUTME: Library root for dockpanel - a Docker control surface over two backends.
// ABOUTME: The engine API client and the SSH shell share one dispatcher; main.rs is the CLI.

pub mod config;
pub mod connector;
pub mod dispatch;
pub mod error;
pub mod runtime;
pub mod ssh;
pub mod types;
