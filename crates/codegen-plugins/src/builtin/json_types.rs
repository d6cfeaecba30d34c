//! Type generator emitting `types.json`: one entry per defined component,
//! with its properties flattened to name/type/format rows.

#![cfg(feature = "builtin")]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use codegen_core::model::{Component, ComponentRef, ComponentSource, Property};

use crate::plugin::TypeGenerator;
use crate::registry::PluginRegistry;
use crate::spec::PluginSpec;

pub const ID: &str = "builtin.json-types";

pub fn register(registry: &mut PluginRegistry) -> Result<()> {
    let spec = PluginSpec::new(ID, "JSON type listing", "0.1.0")
        .support("json")
        .meta("category", "types");
    registry.register_type_generator(spec, Box::new(JsonTypesGenerator))
}

#[derive(Debug, Serialize)]
struct TypesFile<'a> {
    target: &'a str,
    types: Vec<TypeEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct TypeEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<PropertyEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct PropertyEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    format: &'a str,
    required: bool,
}

pub struct JsonTypesGenerator;

impl TypeGenerator for JsonTypesGenerator {
    fn generate(&self, components: &[Component], target: &str, output_path: &Path) -> Result<()> {
        let types = components
            .iter()
            .filter(|c| c.source == ComponentSource::Defined)
            .map(|c| TypeEntry {
                name: &c.name,
                kind: &c.r#type,
                format: &c.format,
                reference: c.reference.as_ref().map(|r| describe_ref(r, components)),
                properties: c.properties.iter().map(property_entry).collect(),
            })
            .collect();

        let file = TypesFile { target, types };
        fs::create_dir_all(output_path)
            .with_context(|| format!("create {}", output_path.display()))?;
        let path = output_path.join("types.json");
        fs::write(&path, serde_json::to_vec_pretty(&file)?)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

fn property_entry(p: &Property) -> PropertyEntry<'_> {
    PropertyEntry {
        name: &p.name,
        kind: &p.r#type,
        format: &p.format,
        required: p.required.unwrap_or(false),
    }
}

// Name of the referenced component, or the primitive type name.
fn describe_ref(r: &ComponentRef, components: &[Component]) -> String {
    match r {
        ComponentRef::Primitive(p) => p.clone(),
        ComponentRef::Component(id) => components
            .iter()
            .find(|c| c.id == *id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{id}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen_core::config::MergePolicy;
    use codegen_core::model::ComponentDraft;
    use codegen_core::registry::UnifiedModel;
    use serde_json::Value;

    #[test]
    fn lists_defined_components_only() {
        let mut m = UnifiedModel::new();
        let pet = m
            .components
            .new_component(
                ComponentDraft {
                    source: ComponentSource::Defined,
                    r#type: "object".into(),
                    ..ComponentDraft::new("Pet")
                },
                MergePolicy::default(),
            )
            .unwrap()
            .id;
        m.components
            .new_component(
                ComponentDraft {
                    source: ComponentSource::Defined,
                    r#type: "array".into(),
                    reference: Some(ComponentRef::Component(pet)),
                    ..ComponentDraft::new("Pets")
                },
                MergePolicy::default(),
            )
            .unwrap();
        m.components
            .new_component(
                ComponentDraft {
                    source: ComponentSource::Inline,
                    ..ComponentDraft::new("Inline")
                },
                MergePolicy::default(),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        JsonTypesGenerator
            .generate(m.components.all(), "go-client", dir.path())
            .unwrap();

        let v: Value =
            serde_json::from_slice(&fs::read(dir.path().join("types.json")).unwrap()).unwrap();
        assert_eq!(v["target"], "go-client");
        let types = v["types"].as_array().unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[1]["name"], "Pets");
        assert_eq!(types[1]["reference"], "Pet");
    }
}
