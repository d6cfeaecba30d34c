//! codegen-core
//!
//! Core primitives for the codegen unification engine:
//! - the canonical data model (resources, components, properties, workflows)
//! - a process-wide monotonic identifier generator
//! - registries that deduplicate, merge and track the "latest" entities
//! - path-parameter and casing helpers shared by loaders and generators
//! - explicit configuration and a small error taxonomy
//!
//! This crate performs no filesystem or network I/O. Loaders, generators and
//! the engine that sequences them live in `codegen-plugins`.

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod ids;
pub mod model;
pub mod registry;
pub mod text;
pub mod version;

pub use crate::errors::{CodegenError, CodegenResult};

/// Logging targets. These replace per-category loggers: filter them with
/// `RUST_LOG=codegen::loaders=debug` and friends.
pub mod targets {
    pub const CORE: &str = "codegen::core";
    pub const LOADERS: &str = "codegen::loaders";
    pub const GENERATORS: &str = "codegen::generators";
    pub const LINTERS: &str = "codegen::linters";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{Aliases, CodegenConfig, LoaderPolicy, MergePolicy};
    pub use crate::diagnostics::{Diagnostic, DiagnosticLevel};
    pub use crate::ids::{EntityId, IdGenerator};
    pub use crate::model::{
        Action, Component, ComponentDraft, ComponentRef, ComponentSource, Expression, Output,
        Parameter, Property, PropertyDraft, QueryIn, Request, Resource, ResourceDraft,
        ResourceRef, ResourceType, Response, ResponseBody, Step, StepTarget, Workflow,
        WorkflowParameter,
    };
    pub use crate::registry::{
        ComponentRegistry, MergeOutcome, ResourceRegistry, UnifiedModel, WorkflowRegistry,
    };
    pub use crate::{CodegenError, CodegenResult};
}
