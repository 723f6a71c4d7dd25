// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates image references and accepts the ssh target shorthand.

use serde::Deserialize;

use super::SshConfig;
use crate::types::ImageRef;

/// Keep the reference as written, rejecting it early if it cannot parse.
pub fn deserialize_image_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)?;
    Ok(s)
}

/// Accept either `ssh: user@host:port` or a full mapping.
pub fn deserialize_ssh<'de, D>(deserializer: D) -> Result<Option<SshConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entry: Option<SshEntry> = Option::deserialize(deserializer)?;
    entry
        .map(SshEntry::into_ssh_config)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SshEntry {
    Simple(String),
    Detailed(SshConfig),
}

impl SshEntry {
    fn into_ssh_config(self) -> Result<SshConfig, String> {
        match self {
            SshEntry::Simple(s) => SshConfig::parse(&s),
            SshEntry::Detailed(c) => Ok(c),
        }
    }
}
