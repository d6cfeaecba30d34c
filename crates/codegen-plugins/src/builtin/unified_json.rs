//! Loader for the unified JSON document shape.
//!
//! Input:
//!   {
//!     "resources":  [ Resource, ... ],
//!     "components": [ Component, ... ],
//!     "workflows":  [ Workflow, ... ]
//!   }
//!
//! This is the payload out-of-process loaders return, so any external tool
//! that can emit it plugs in without a native loader. Ids only need to be
//! consistent within the document; the engine re-assigns them on merge.
//!
//! Aliases from `Shared` shorten `source_doc` values, so long URLs do not
//! leak into generated output.

#![cfg(feature = "builtin")]

use anyhow::{Context, Result};
use serde_json::Value;

use codegen_core::model::make_unique_id;

use crate::plugin::{Loader, LoaderResources, Shared};
use crate::registry::PluginRegistry;
use crate::spec::PluginSpec;

pub const ID: &str = "builtin.unified-json";

pub fn register(registry: &mut PluginRegistry) -> Result<()> {
    let spec = PluginSpec::new(ID, "Unified model JSON loader", "0.1.0")
        .support("json")
        .meta("category", "loader");
    registry.register_loader(spec, Box::new(UnifiedJsonLoader))
}

pub struct UnifiedJsonLoader;

impl Loader for UnifiedJsonLoader {
    fn load(&self, location: &str, contents: &[u8], shared: &Shared) -> Result<LoaderResources> {
        let value: Value = serde_json::from_slice(contents)
            .with_context(|| format!("{location} is not valid JSON"))?;

        let Some(obj) = value.as_object() else {
            anyhow::bail!("{location}: expected a JSON object");
        };
        if !["resources", "components", "workflows"]
            .iter()
            .any(|k| obj.contains_key(*k))
        {
            anyhow::bail!("{location}: not a unified model document");
        }

        let mut out: LoaderResources = serde_json::from_value(value)
            .with_context(|| format!("{location}: unified model document has an invalid shape"))?;

        let aliases = shared.aliases();
        for c in &mut out.components {
            c.source_doc = aliases.shorten(&c.source_doc);
        }
        for r in &mut out.resources {
            r.source_doc = aliases.shorten(&r.source_doc);
            r.resource_id = make_unique_id(&r.path, &r.method);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen_core::config::Aliases;
    use codegen_core::ids::IdGenerator;
    use serde_json::json;

    fn shared() -> Shared {
        let mut aliases = Aliases::new();
        aliases.insert("https://petstore.example.com/openapi.json", "petstore");
        Shared::new(IdGenerator::shared(), aliases)
    }

    #[test]
    fn loads_document_and_applies_aliases() {
        let doc = json!({
            "components": [
                {"id": 1, "name": "Pet", "source": "defined",
                 "source_doc": "https://petstore.example.com/openapi.json"}
            ],
            "resources": [
                {"id": 2, "path": "/pets/{id}", "method": "get", "resource_id": "", "root": "/pets",
                 "components": [1]}
            ]
        });
        let bytes = serde_json::to_vec(&doc).unwrap();
        let out = UnifiedJsonLoader.load("mem", &bytes, &shared()).unwrap();

        assert_eq!(out.components[0].source_doc, "petstore");
        assert_eq!(out.resources[0].resource_id, "get:pets/id");
        assert!(out.workflows.is_empty());
    }

    #[test]
    fn rejects_foreign_documents() {
        let s = shared();
        assert!(UnifiedJsonLoader.load("a", b"not json", &s).is_err());
        assert!(UnifiedJsonLoader.load("b", b"[1,2]", &s).is_err());
        assert!(UnifiedJsonLoader.load("c", br#"{"openapi": "3.1.0"}"#, &s).is_err());
    }
}
