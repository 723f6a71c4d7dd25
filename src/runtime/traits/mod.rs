// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ContainerOps, ImageOps, ExecOps, LogOps, StatsOps, RuntimeInfo.

mod container;
mod exec;
mod image;
mod logs;
mod runtime_info;
pub(crate) mod sealed;
mod shared_types;
mod stats;

pub use container::{ContainerError, ContainerFilters, ContainerOps};
pub use exec::{ExecError, ExecOps};
pub use image::{ImageError, ImageOps};
pub use logs::{LogError, LogLine, LogLineStream, LogOps, LogOptions, LogStream};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;
pub use stats::{StatsError, StatsOps};

/// Every capability the structured backend offers.
pub trait Engine: ContainerOps + ImageOps + ExecOps + LogOps + StatsOps + RuntimeInfo {}

impl<T> Engine for T where T: ContainerOps + ImageOps + ExecOps + LogOps + StatsOps + RuntimeInfo {}
