// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Container/image ids and parsed image references.

mod id;
mod image_ref;

pub use id::{ContainerId, ImageId};
pub use image_ref::{ImageRef, ParseImageRefError};
