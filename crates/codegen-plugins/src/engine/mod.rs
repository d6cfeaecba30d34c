//! The unification engine.
//!
//! `Engine` owns the unified model for its lifetime and sequences:
//!
//! 1. load: fetch each source, lint it (optional), offer it to loaders
//! 2. merge: fold every loader's partial model into the registries
//! 3. reduce: keep only what workflow steps reach (optional)
//! 4. generate: configure and run each target's generator
//!
//! A single lock guards the model. `load` holds it for one source,
//! `generate` holds it for the whole pipeline, so a `load` issued while a
//! `generate` runs waits rather than mutating the model mid-generation.
//!
//! Nothing here fails for a per-source or per-target problem. Those are
//! logged and returned as diagnostics in the report.

mod bespoke;
mod generate;
mod load;
mod merge;

pub use bespoke::{reduce_to_workflows, BespokeSummary};
pub use generate::output_dir;
pub use merge::{merge_into, MergeSummary};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};

use codegen_core::config::CodegenConfig;
use codegen_core::diagnostics::{Diagnostic, DiagnosticsExt};
use codegen_core::registry::UnifiedModel;
use codegen_core::CodegenResult;

use crate::plugin::{Generator, Shared, TypeGenerator};
use crate::registry::PluginRegistry;
use crate::source::{FsFetcher, Source, SourceFetcher};

/// One generation target: a generator instance plus where its output goes.
pub struct Target {
    pub name: String,
    pub variant: String,
    pub r#type: String,
    pub generator: Box<dyn Generator>,
    /// Per-target settings. Its variables replace the run's variables.
    pub configuration: Option<CodegenConfig>,
}

impl Target {
    pub fn new(name: impl Into<String>, generator: Box<dyn Generator>) -> Self {
        Self {
            name: name.into(),
            variant: String::new(),
            r#type: String::new(),
            generator,
            configuration: None,
        }
    }

    /// Instantiate a catalog generator by `name` and `variant`.
    pub fn from_catalog(plugins: &PluginRegistry, name: &str, variant: &str) -> CodegenResult<Self> {
        let entry = plugins.find_generator_by_name(name, variant).ok_or_else(|| {
            codegen_core::CodegenError::not_found(format!("generator {name}-{variant}"))
        })?;
        Ok(Self {
            name: entry.name.clone(),
            variant: entry.variant.clone(),
            r#type: entry.r#type.clone(),
            generator: entry.instantiate(),
            configuration: None,
        })
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_type(mut self, r#type: impl Into<String>) -> Self {
        self.r#type = r#type.into();
        self
    }

    pub fn with_configuration(mut self, cfg: CodegenConfig) -> Self {
        self.configuration = Some(cfg);
        self
    }

    /// `name-variant`, the identifier handed to type generators.
    pub fn id(&self) -> String {
        format!("{}-{}", self.name, self.variant)
    }

    fn variables<'a>(&'a self, fallback: &'a Map<String, Value>) -> &'a Map<String, Value> {
        match &self.configuration {
            Some(c) if c.has_variables() => &c.variables,
            _ => fallback,
        }
    }
}

/// Outcome of loading one source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub location: String,
    pub loaded: bool,
    pub excluded: bool,
    /// Ids of loaders that succeeded.
    pub loaders: Vec<String>,
    pub merged: MergeSummary,
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsExt for LoadReport {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: String,
    pub output: PathBuf,
    pub generated: bool,
}

/// Outcome of a full generate run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub sources: Vec<LoadReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bespoke: Option<BespokeSummary>,
    pub targets: Vec<TargetReport>,
    /// Every diagnostic of the run, load diagnostics included.
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsExt for GenerateReport {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

pub struct Engine {
    plugins: PluginRegistry,
    fetcher: Box<dyn SourceFetcher>,
    model: Mutex<UnifiedModel>,
}

impl Engine {
    pub fn new(plugins: PluginRegistry) -> Self {
        Self {
            plugins,
            fetcher: Box::new(FsFetcher),
            model: Mutex::new(UnifiedModel::new()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Shared values for loaders, seeded with the config's aliases.
    pub fn shared(&self, config: &CodegenConfig) -> Shared {
        let ids = Arc::clone(self.model.lock().ids());
        Shared::new(ids, config.aliases.clone())
    }

    /// Load one source into the model.
    pub fn load(&self, source: &mut Source, shared: &Shared, config: &CodegenConfig) -> LoadReport {
        let mut model = self.model.lock();
        load::load_source(
            &mut model,
            &self.plugins,
            self.fetcher.as_ref(),
            source,
            shared,
            config,
        )
    }

    /// Run the whole pipeline: load every source, optionally reduce, then
    /// generate every target under `output_path`.
    pub fn generate(
        &self,
        sources: &mut [Source],
        targets: &mut [Target],
        output_path: &Path,
        type_generator: Option<&dyn TypeGenerator>,
        config: &CodegenConfig,
    ) -> GenerateReport {
        let mut model = self.model.lock();
        let shared = Shared::new(Arc::clone(model.ids()), config.aliases.clone());

        generate::run(
            &mut model,
            &self.plugins,
            self.fetcher.as_ref(),
            generate::Run {
                sources,
                targets,
                output_path,
                type_generator,
                shared: &shared,
                config,
            },
        )
    }

    /// Read access to the current model.
    pub fn with_model<R>(&self, f: impl FnOnce(&UnifiedModel) -> R) -> R {
        f(&self.model.lock())
    }

    /// Drop everything loaded so far. Ids keep increasing.
    pub fn reset(&self) {
        let mut model = self.model.lock();
        let ids = Arc::clone(model.ids());
        *model = UnifiedModel::with_ids(ids);
    }
}
