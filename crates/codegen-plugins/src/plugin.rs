//! Plugin contracts.
//!
//! Four capabilities can be plugged into the engine:
//! - `Loader`: turns one raw source into a partial model
//! - `Generator`: consumes the unified model and writes output
//! - `TypeGenerator`: consumes only components (schema/type emission)
//! - `Linter`: checks raw source bytes before loading
//!
//! Plugins report failures with `anyhow`. The engine never lets one plugin's
//! failure stop the others; failures become diagnostics.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use codegen_core::config::Aliases;
use codegen_core::ids::IdGenerator;
use codegen_core::model::{Component, Resource, Workflow};
use codegen_core::registry::UnifiedModel;
use codegen_core::targets;

/// Partial model contributed by one loader for one source.
///
/// Ids inside are only meaningful within this value: the engine assigns
/// fresh ids when merging and rewrites every cross reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderResources {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

impl LoaderResources {
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.components.is_empty() && self.workflows.is_empty()
    }

    /// Take everything a loader built up in its own scratch model.
    pub fn from_model(model: &UnifiedModel) -> Self {
        Self {
            resources: model.resources.all().to_vec(),
            components: model.components.all().to_vec(),
            workflows: model.workflows.all().to_vec(),
        }
    }
}

/// Values shared with every loader for one engine run.
///
/// Carries the resolved aliases, the engine's id generator (so a loader's
/// scratch model allocates ids that never collide with stored ones), and an
/// open key/value bag.
#[derive(Debug, Clone)]
pub struct Shared {
    ids: Arc<IdGenerator>,
    aliases: Aliases,
    values: BTreeMap<String, Value>,
}

impl Shared {
    pub fn new(ids: Arc<IdGenerator>, aliases: Aliases) -> Self {
        Self {
            ids,
            aliases,
            values: BTreeMap::new(),
        }
    }

    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    /// A scratch model drawing ids from the engine's generator.
    pub fn scratch_model(&self) -> UnifiedModel {
        UnifiedModel::with_ids(Arc::clone(&self.ids))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }
}

/// Read-only view of the unified model handed to a generator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratorContext {
    pub resources: Vec<Resource>,
    pub components: Vec<Component>,
    pub workflows: Vec<Workflow>,
    pub variables: Map<String, Value>,
}

impl GeneratorContext {
    pub fn snapshot(model: &UnifiedModel, variables: Map<String, Value>) -> Self {
        Self {
            resources: model.resources.all().to_vec(),
            components: model.components.all().to_vec(),
            workflows: model.workflows.all().to_vec(),
            variables,
        }
    }
}

/// Source format loader.
pub trait Loader: Send + Sync {
    /// Parse `contents` (fetched from `location`) into a partial model.
    ///
    /// Returning an error skips this loader for this source only.
    fn load(&self, location: &str, contents: &[u8], shared: &Shared) -> Result<LoaderResources>;
}

/// Output generator.
///
/// Generators are stateful: each target owns its instance, which the engine
/// configures from `variables` before calling `generate`.
pub trait Generator: Send {
    /// Apply configuration variables. The default ignores them.
    fn configure(&mut self, _variables: &Map<String, Value>) -> Result<()> {
        Ok(())
    }

    fn generate(&self, output_path: &Path, ctx: &GeneratorContext) -> Result<()>;
}

/// Schema/type emitter, called once per target before its generator.
pub trait TypeGenerator: Send + Sync {
    /// `target` is `name-variant` of the target being generated.
    fn generate(&self, components: &[Component], target: &str, output_path: &Path) -> Result<()>;
}

/// Source linter.
pub trait Linter: Send + Sync {
    fn lint(&self, source_type: &str, contents: &[u8]) -> Result<()>;
}

/// Overlay `variables` onto a serializable settings object by field name.
///
/// Keys that are not fields of `T` are ignored. A value of the wrong type
/// fails the whole overlay and leaves `target` untouched.
pub fn overlay_variables<T>(target: &mut T, variables: &Map<String, Value>) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut current = serde_json::to_value(&*target)?;
    let Some(fields) = current.as_object_mut() else {
        anyhow::bail!("generator settings must serialize to a JSON object");
    };

    let mut applied = 0usize;
    for (k, v) in variables {
        if let Some(slot) = fields.get_mut(k) {
            *slot = v.clone();
            applied += 1;
        } else {
            debug!(target: targets::GENERATORS, key = %k, "variable does not match a setting");
        }
    }

    if applied > 0 {
        *target = serde_json::from_value(current)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Settings {
        package: String,
        indent: u32,
    }

    fn vars(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn overlay_matches_fields_and_ignores_unknown() {
        let mut s = Settings {
            package: "default".into(),
            indent: 2,
        };
        overlay_variables(&mut s, &vars(json!({"package": "pets", "unknown": true}))).unwrap();
        assert_eq!(s.package, "pets");
        assert_eq!(s.indent, 2);
    }

    #[test]
    fn overlay_type_mismatch_leaves_target_untouched() {
        let mut s = Settings {
            package: "default".into(),
            indent: 2,
        };
        assert!(overlay_variables(&mut s, &vars(json!({"indent": "wide"}))).is_err());
        assert_eq!(s.indent, 2);
    }

    #[test]
    fn shared_scratch_model_uses_engine_ids() {
        let ids = IdGenerator::shared();
        ids.next_id();
        let shared = Shared::new(Arc::clone(&ids), Aliases::new());
        let model = shared.scratch_model();
        assert_eq!(model.ids().peek(), ids.peek());
    }
}
