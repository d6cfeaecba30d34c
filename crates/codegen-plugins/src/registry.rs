//! Plugin registry.
//!
//! Stores loaders, linters, type generators and the generator catalog.
//!
//! Requirements:
//! - loaders and linters run in registration order, so they live in `Vec`s
//! - catalogs used only for lookup and listing are `BTreeMap`s (stable order)
//! - clear errors for duplicate registrations
//! - no global mutable state
//!
//! Generators are registered as factories rather than instances: every
//! target gets its own instance so per-target configuration never leaks.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::plugin::{Generator, Linter, Loader, TypeGenerator};
use crate::spec::PluginSpec;

/// A loader instance plus its static spec.
pub struct RegisteredLoader {
    pub spec: PluginSpec,
    pub loader: Box<dyn Loader>,
}

pub struct RegisteredLinter {
    pub spec: PluginSpec,
    pub linter: Box<dyn Linter>,
}

pub struct RegisteredTypeGenerator {
    pub spec: PluginSpec,
    pub generator: Box<dyn TypeGenerator>,
}

pub type GeneratorFactory = fn() -> Box<dyn Generator>;

/// Catalog entry for a generator, identified by `name-variant`.
pub struct GeneratorEntry {
    pub spec: PluginSpec,
    pub name: String,
    pub variant: String,
    /// Output kind, e.g. "sdk" or "server". May be empty.
    pub r#type: String,
    factory: GeneratorFactory,
}

impl GeneratorEntry {
    pub fn key(&self) -> String {
        generator_key(&self.name, &self.variant)
    }

    pub fn instantiate(&self) -> Box<dyn Generator> {
        (self.factory)()
    }
}

fn generator_key(name: &str, variant: &str) -> String {
    format!("{name}-{variant}")
}

/// Kind of a listed plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    Loader,
    Linter,
    Generator,
    TypeGenerator,
}

impl PluginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loader => "loader",
            Self::Linter => "linter",
            Self::Generator => "generator",
            Self::TypeGenerator => "type_generator",
        }
    }
}

/// One row of [`PluginRegistry::list`].
#[derive(Debug, Clone, Serialize)]
pub struct PluginSummary {
    pub kind: PluginKind,
    #[serde(flatten)]
    pub spec: PluginSpec,
}

#[derive(Default)]
pub struct PluginRegistry {
    loaders: Vec<RegisteredLoader>,
    linters: Vec<RegisteredLinter>,
    type_generators: BTreeMap<String, RegisteredTypeGenerator>,
    generators: BTreeMap<String, GeneratorEntry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader. Loaders are offered sources in this order.
    pub fn register_loader(&mut self, spec: PluginSpec, loader: Box<dyn Loader>) -> Result<()> {
        spec.validate()?;
        if self.find_loader_by_name(spec.id.as_str()).is_some() {
            anyhow::bail!("loader id already registered: {}", spec.id);
        }
        self.loaders.push(RegisteredLoader { spec, loader });
        Ok(())
    }

    pub fn register_linter(&mut self, spec: PluginSpec, linter: Box<dyn Linter>) -> Result<()> {
        spec.validate()?;
        if self.find_linter_by_name(spec.id.as_str()).is_some() {
            anyhow::bail!("linter id already registered: {}", spec.id);
        }
        self.linters.push(RegisteredLinter { spec, linter });
        Ok(())
    }

    pub fn register_type_generator(
        &mut self,
        spec: PluginSpec,
        generator: Box<dyn TypeGenerator>,
    ) -> Result<()> {
        spec.validate()?;
        let id = spec.id.as_str().to_string();
        if self.type_generators.contains_key(&id) {
            anyhow::bail!("type generator id already registered: {id}");
        }
        self.type_generators
            .insert(id, RegisteredTypeGenerator { spec, generator });
        Ok(())
    }

    /// Add a generator to the catalog under `name-variant`.
    pub fn register_generator(
        &mut self,
        spec: PluginSpec,
        name: impl Into<String>,
        variant: impl Into<String>,
        r#type: impl Into<String>,
        factory: GeneratorFactory,
    ) -> Result<()> {
        spec.validate()?;
        let entry = GeneratorEntry {
            spec,
            name: name.into(),
            variant: variant.into(),
            r#type: r#type.into(),
            factory,
        };
        if entry.name.is_empty() {
            anyhow::bail!("generator name is empty");
        }

        let key = entry.key();
        if self.generators.contains_key(&key) {
            anyhow::bail!("generator already registered: {key}");
        }
        self.generators.insert(key, entry);
        Ok(())
    }

    pub fn loaders(&self) -> &[RegisteredLoader] {
        &self.loaders
    }

    pub fn find_loader_by_name(&self, name: &str) -> Option<&RegisteredLoader> {
        self.loaders.iter().find(|l| l.spec.id.as_str() == name)
    }

    /// First loader, in registration order, that handles `source_type`.
    pub fn find_loader_by_type(&self, source_type: &str) -> Option<&RegisteredLoader> {
        self.loaders.iter().find(|l| l.spec.supports_type(source_type))
    }

    pub fn linters(&self) -> &[RegisteredLinter] {
        &self.linters
    }

    /// Match on the linter id, or on `id-type` for any type it supports.
    pub fn find_linter_by_name(&self, name: &str) -> Option<&RegisteredLinter> {
        self.linters.iter().find(|l| {
            let id = l.spec.id.as_str();
            id == name
                || l
                    .spec
                    .supports
                    .iter()
                    .any(|t| generator_key(id, t) == name)
        })
    }

    /// Every linter handling `source_type`, in registration order.
    pub fn linters_for_type<'a>(
        &'a self,
        source_type: &'a str,
    ) -> impl Iterator<Item = &'a RegisteredLinter> + 'a {
        self.linters
            .iter()
            .filter(move |l| l.spec.supports_type(source_type))
    }

    pub fn type_generator(&self, id: &str) -> Option<&dyn TypeGenerator> {
        self.type_generators.get(id).map(|t| t.generator.as_ref())
    }

    pub fn find_generator_by_name(&self, name: &str, variant: &str) -> Option<&GeneratorEntry> {
        self.generators.get(&generator_key(name, variant))
    }

    pub fn generators(&self) -> impl Iterator<Item = &GeneratorEntry> {
        self.generators.values()
    }

    /// Every registered plugin, grouped by kind.
    pub fn list(&self) -> Vec<PluginSummary> {
        let loaders = self.loaders.iter().map(|l| (PluginKind::Loader, &l.spec));
        let linters = self.linters.iter().map(|l| (PluginKind::Linter, &l.spec));
        let types = self
            .type_generators
            .values()
            .map(|t| (PluginKind::TypeGenerator, &t.spec));
        let gens = self
            .generators
            .values()
            .map(|g| (PluginKind::Generator, &g.spec));

        loaders
            .chain(linters)
            .chain(gens)
            .chain(types)
            .map(|(kind, spec)| PluginSummary {
                kind,
                spec: spec.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.loaders.len() + self.linters.len() + self.type_generators.len() + self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
