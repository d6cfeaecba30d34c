//! codegen-plugins
//!
//! The pluggable half of codegen:
//! - the `Loader`, `Generator`, `TypeGenerator` and `Linter` contracts
//! - `PluginSpec` metadata and the `PluginRegistry` that stores plugins
//! - the `Engine`, which loads sources, merges them into one unified model,
//!   optionally reduces it to what workflows use, and drives generators
//! - a small set of built-in plugins (feature `builtin`, on by default)
//!
//! There is no global plugin state. A host builds a registry, registers what
//! it needs, and hands the registry to an engine.

pub mod engine;
pub mod plugin;
pub mod registry;
pub mod source;
pub mod spec;

#[cfg(feature = "builtin")]
pub mod builtin;

pub use engine::{Engine, GenerateReport, LoadReport, Target};
pub use plugin::{
    overlay_variables, Generator, GeneratorContext, Linter, Loader, LoaderResources, Shared,
    TypeGenerator,
};
pub use registry::PluginRegistry;
pub use source::{FsFetcher, Source, SourceFetcher, SourceKind};
pub use spec::{PluginId, PluginSpec};
