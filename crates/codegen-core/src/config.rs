//! Configuration structures for codegen.
//!
//! `CodegenConfig` is the explicit, serializable object a caller hands to the
//! engine. The core crate itself does not read environment variables; the
//! CLI (or any embedding service) is responsible for building the config.
//!
//! JSON field names follow the established configuration format:
//! `variables`, `aliases`, `bespoke`, `lint`, `validate`. The merge/loader
//! policies and `resolve_latest` are optional and default as documented on
//! each type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CodegenError, CodegenResult};

/// How an incoming entity is reconciled with a stored one that fully matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the stored entity untouched.
    KeepExisting,
    /// Overwrite the stored entity's fields with the incoming ones (id kept).
    Replace,
    /// Keep populated stored fields, fill empty ones from the incoming entity.
    #[default]
    FieldUnion,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepExisting => "keep_existing",
            Self::Replace => "replace",
            Self::FieldUnion => "field_union",
        }
    }
}

/// Which loaders see a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderPolicy {
    /// Every registered loader is offered every source.
    #[default]
    All,
    /// Stop at the first loader that succeeds for a source.
    FirstSuccess,
}

impl LoaderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::FirstSuccess => "first_success",
        }
    }
}

/// Long value -> short value substitutions made available to loaders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aliases(pub BTreeMap<String, String>);

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Exact-key lookup.
    pub fn find_alias(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Replace every alias key occurring in `text` by its value. Longer keys
    /// are applied first so a key that prefixes another does not win.
    pub fn shorten(&self, text: &str) -> String {
        let mut keys: Vec<&String> = self.0.keys().filter(|k| !k.is_empty()).collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut out = text.to_string();
        for k in keys {
            if out.contains(k.as_str()) {
                out = out.replace(k.as_str(), &self.0[k]);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Generator settings, applied by field-name match.
    #[serde(default)]
    pub variables: Map<String, Value>,

    #[serde(default)]
    pub aliases: Aliases,

    /// Reduce the model to what workflow steps reference before generating.
    #[serde(default, rename = "bespoke")]
    pub bespoke_workflow: bool,

    #[serde(default)]
    pub lint: bool,

    /// With `lint`, exclude sources that fail linting.
    #[serde(default)]
    pub validate: bool,

    #[serde(default)]
    pub merge_policy: MergePolicy,

    #[serde(default)]
    pub loader_policy: LoaderPolicy,

    /// Recompute `latest` flags across versions after loading.
    #[serde(default)]
    pub resolve_latest: bool,
}

impl CodegenConfig {
    pub fn from_json_str(s: &str) -> CodegenResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CodegenConfig) -> CodegenResult<()> {
    if cfg.aliases.0.keys().any(String::is_empty) {
        return Err(CodegenError::invalid_argument("alias keys must not be empty"));
    }

    if cfg.validate && !cfg.lint {
        tracing::debug!(
            target: crate::targets::CORE,
            "validate is set without lint; it has no effect"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = CodegenConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.merge_policy, MergePolicy::FieldUnion);
        assert_eq!(cfg.loader_policy, LoaderPolicy::All);
    }

    #[test]
    fn parses_established_field_names() {
        let cfg = CodegenConfig::from_json_str(
            r#"{
                "variables": {"package": "petstore"},
                "aliases": {"https://api.example.com/v1": "ex"},
                "bespoke": true,
                "lint": true,
                "validate": true,
                "merge_policy": "keep_existing"
            }"#,
        )
        .unwrap();

        assert!(cfg.bespoke_workflow);
        assert!(cfg.lint && cfg.validate);
        assert_eq!(cfg.merge_policy, MergePolicy::KeepExisting);
        assert_eq!(cfg.variables["package"], "petstore");
        assert_eq!(cfg.aliases.find_alias("https://api.example.com/v1"), Some("ex"));
    }

    #[test]
    fn empty_alias_key_rejected() {
        let mut cfg = CodegenConfig::default();
        cfg.aliases.insert("", "x");
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn shorten_prefers_longest_key() {
        let mut a = Aliases::new();
        a.insert("https://api.example.com", "ex");
        a.insert("https://api.example.com/v2", "ex2");
        assert_eq!(a.shorten("https://api.example.com/v2/pets"), "ex2/pets");
        assert_eq!(a.shorten("https://api.example.com/v1"), "ex/v1");
        assert_eq!(a.find_alias("missing"), None);
    }
}
