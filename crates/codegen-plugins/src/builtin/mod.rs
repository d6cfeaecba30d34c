//! Built-in plugins.
//!
//! - `builtin.unified-json`: loader for documents already in the unified
//!   model shape (`{resources, components, workflows}`)
//! - `builtin.json-syntax`: linter rejecting malformed JSON
//! - `builtin.model-json`: generator writing the whole model as JSON
//! - `builtin.json-types`: type generator listing defined components
//!
//! Each module exposes a `register` function; `register_all` wires every
//! built-in into a registry.

#![cfg(feature = "builtin")]

pub mod json_lint;
pub mod json_types;
pub mod model_json;
pub mod unified_json;

use anyhow::Result;

use crate::registry::PluginRegistry;

pub fn register_all(registry: &mut PluginRegistry) -> Result<()> {
    unified_json::register(registry)?;
    json_lint::register(registry)?;
    model_json::register(registry)?;
    json_types::register(registry)?;
    Ok(())
}

/// A registry with every built-in registered.
pub fn registry() -> Result<PluginRegistry> {
    let mut r = PluginRegistry::new();
    register_all(&mut r)?;
    Ok(r)
}
