//! Generator writing the unified model as one JSON file.
//!
//! Useful for inspecting what loaders produced, and as the hand-off format
//! for out-of-process generators.
//!
//! Settings (overridable through variables):
//! - `file_name` (default `model.json`)
//! - `pretty` (default `true`)
//! - `include_variables` (default `false`)

#![cfg(feature = "builtin")]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plugin::{overlay_variables, Generator, GeneratorContext};
use crate::registry::PluginRegistry;
use crate::spec::PluginSpec;

pub const NAME: &str = "model";
pub const VARIANT: &str = "json";

pub fn register(registry: &mut PluginRegistry) -> Result<()> {
    let spec = PluginSpec::new("builtin.model-json", "Unified model JSON writer", "0.1.0")
        .support("json")
        .meta("category", "generator");
    registry.register_generator(spec, NAME, VARIANT, "", new_generator)
}

fn new_generator() -> Box<dyn Generator> {
    Box::new(ModelJsonGenerator::default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelJsonSettings {
    pub file_name: String,
    pub pretty: bool,
    pub include_variables: bool,
}

impl Default for ModelJsonSettings {
    fn default() -> Self {
        Self {
            file_name: "model.json".to_string(),
            pretty: true,
            include_variables: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ModelJsonGenerator {
    pub settings: ModelJsonSettings,
}

impl Generator for ModelJsonGenerator {
    fn configure(&mut self, variables: &Map<String, Value>) -> Result<()> {
        overlay_variables(&mut self.settings, variables)
    }

    fn generate(&self, output_path: &Path, ctx: &GeneratorContext) -> Result<()> {
        if self.settings.file_name.trim().is_empty() {
            anyhow::bail!("file_name must not be empty");
        }

        let mut doc = serde_json::to_value(ctx)?;
        if !self.settings.include_variables {
            if let Some(obj) = doc.as_object_mut() {
                obj.remove("variables");
            }
        }

        let bytes = if self.settings.pretty {
            serde_json::to_vec_pretty(&doc)?
        } else {
            serde_json::to_vec(&doc)?
        };

        fs::create_dir_all(output_path)
            .with_context(|| format!("create {}", output_path.display()))?;
        let path = output_path.join(&self.settings.file_name);
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let g = ModelJsonGenerator::default();
        g.generate(dir.path(), &GeneratorContext::default()).unwrap();

        let raw = fs::read_to_string(dir.path().join("model.json")).unwrap();
        let v: Value = serde_json::from_str(&raw).unwrap();
        assert!(v["resources"].as_array().unwrap().is_empty());
        assert!(v.get("variables").is_none());
    }

    #[test]
    fn variables_override_settings() {
        let mut g = ModelJsonGenerator::default();
        let vars = json!({"file_name": "out.json", "pretty": false, "package": "ignored"});
        g.configure(vars.as_object().unwrap()).unwrap();
        assert_eq!(g.settings.file_name, "out.json");
        assert!(!g.settings.pretty);
    }
}
