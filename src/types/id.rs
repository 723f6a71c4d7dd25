// ABOUTME: Phantom-typed identifiers for container and image ids.
// ABOUTME: Keeps the two id kinds apart at compile time and derives short ids.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum ContainerMarker {}
pub enum ImageMarker {}

const CONTAINER_SHORT_LEN: usize = 12;
const IMAGE_SHORT_LEN: usize = 10;
const DIGEST_PREFIX: &str = "sha256:";

/// An engine identifier tagged with the kind of object it names.
///
/// A `ContainerId` cannot be passed where an `ImageId` is expected, even
/// though both are plain strings on the wire.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl Id<ContainerMarker> {
    /// First twelve characters of the id, as `docker ps` prints it.
    pub fn short_id(&self) -> String {
        self.value.chars().take(CONTAINER_SHORT_LEN).collect()
    }
}

impl Id<ImageMarker> {
    /// Digest prefix plus ten hex characters, e.g. `sha256:0123456789`.
    pub fn short_id(&self) -> String {
        match self.value.strip_prefix(DIGEST_PREFIX) {
            Some(hex) => {
                let head: String = hex.chars().take(IMAGE_SHORT_LEN).collect();
                format!("{DIGEST_PREFIX}{head}")
            }
            None => self.value.chars().take(IMAGE_SHORT_LEN).collect(),
        }
    }
}

// Manual trait implementations that don't require T to implement the trait.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type ContainerId = Id<ContainerMarker>;
pub type ImageId = Id<ImageMarker>;
