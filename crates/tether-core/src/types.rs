// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common identifiers and status types shared by the plugin runtime and the bridge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Process-unique identifier of a discovered plugin record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(pub Uuid);

impl PluginId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PluginId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PluginId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Declared category under which a plugin is indexed and looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityType(String);

impl CapabilityType {
    /// Type assigned to plugins whose manifest declares none.
    pub const GENERIC: &'static str = "generic";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn generic() -> Self {
        Self(Self::GENERIC.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CapabilityType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lifecycle status of a plugin record.
///
/// `Ready` is the post-discovery state, `Loaded` means the entry point ran and
/// the mount hook completed, `Unloaded` is terminal for that record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    Ready,
    Loaded,
    Unloaded,
}

/// Cheap summary of a plugin record, handed to the extension context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: PluginId,
    pub name: String,
    pub version: String,
    pub capability_type: CapabilityType,
}

/// Identifier of one isolated front-end (remote) context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_ids_are_unique_and_parse_back() {
        let a = PluginId::new();
        let b = PluginId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<PluginId>().unwrap(), a);
    }

    #[test]
    fn plugin_id_serializes_as_bare_uuid() {
        let id = PluginId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<PluginId>(&json).unwrap(), id);
    }

    #[test]
    fn status_display_and_parse() {
        for status in [PluginStatus::Ready, PluginStatus::Loaded, PluginStatus::Unloaded] {
            let s = status.to_string();
            assert_eq!(s, s.to_lowercase());
            assert_eq!(PluginStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&PluginStatus::Loaded).unwrap(),
            "\"loaded\""
        );
    }

    #[test]
    fn capability_type_is_transparent_string() {
        let ty = CapabilityType::from("executor");
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"executor\"");
        assert_eq!(CapabilityType::generic().as_str(), "generic");
    }
}
