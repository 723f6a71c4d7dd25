// ABOUTME: Client-side substring filters over container and image listings.
// ABOUTME: Preserves engine order; an empty needle keeps everything.

use crate::runtime::{ContainerSummary, ImageSummary};

/// Keep containers whose name contains `needle`, ignoring case.
pub fn filter_containers(containers: Vec<ContainerSummary>, needle: &str) -> Vec<ContainerSummary> {
    if needle.is_empty() {
        return containers;
    }
    let needle = needle.to_lowercase();
    containers
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

/// Keep images with at least one tag containing `needle`, case-sensitively.
///
/// Untagged images never match a non-empty needle.
pub fn filter_images(images: Vec<ImageSummary>, needle: &str) -> Vec<ImageSummary> {
    if needle.is_empty() {
        return images;
    }
    images
        .into_iter()
        .filter(|image| image.has_tag_containing(needle))
        .collect()
}
