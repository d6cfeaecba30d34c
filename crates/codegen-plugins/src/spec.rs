//! Plugin metadata: ids and static descriptions.
//!
//! A spec is the static, data-only description of a plugin:
//! - identity (id, display name, version)
//! - the source types it handles (loaders, linters) or emits (generators)
//! - free-form metadata for listings
//!
//! Specs are used for registry lookups and for the `plugins` listing. They
//! never execute code.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::Serialize;

/// Dotted plugin id, e.g. `builtin.unified-json`. Unique per registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginSpec {
    pub id: PluginId,

    /// Display name for listings.
    pub name: String,

    pub version: String,

    /// Source types handled (e.g. "json", "openapi", "postman").
    pub supports: Vec<String>,

    /// Arbitrary metadata for listings.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl PluginSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: PluginId::new(id),
            name: name.into(),
            version: version.into(),
            supports: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn support(mut self, source_type: impl Into<String>) -> Self {
        self.supports.push(source_type.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn supports_type(&self, source_type: &str) -> bool {
        self.supports.iter().any(|t| t == source_type)
    }

    /// Reject specs that would make lookups or listings ambiguous.
    pub fn validate(&self) -> Result<()> {
        let id = self.id.as_str();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            anyhow::bail!("plugin id {id:?} must be non-empty and contain no whitespace");
        }
        if !id.is_ascii() {
            anyhow::bail!("plugin id {id:?} is not ASCII");
        }
        for (field, value) in [("name", &self.name), ("version", &self.version)] {
            if value.trim().is_empty() {
                anyhow::bail!("plugin {id}: {field} is empty");
            }
        }
        if self.supports.iter().any(|t| t.trim().is_empty()) {
            anyhow::bail!("plugin {id}: blank source type");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_spec_passes() {
        let s = PluginSpec::new("builtin.unified-json", "Unified JSON", "0.1.0").support("json");
        assert!(s.validate().is_ok());
        assert!(s.supports_type("json"));
        assert!(!s.supports_type("openapi"));
    }

    #[test]
    fn blank_or_malformed_fields_rejected() {
        assert!(PluginSpec::new(" ", "X", "0.1.0").validate().is_err());
        assert!(PluginSpec::new("x", "", "0.1.0").validate().is_err());
        assert!(PluginSpec::new("x", "X", "").validate().is_err());
        assert!(PluginSpec::new("plugin.é", "X", "0.1.0").validate().is_err());
        assert!(PluginSpec::new("my plugin", "X", "0.1.0").validate().is_err());
        assert!(PluginSpec::new("x", "X", "0.1.0").support(" ").validate().is_err());
    }
}
