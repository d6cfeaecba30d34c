//! Canonical stores for the unified model.
//!
//! Each registry is the only place its entity kind is created. All three
//! draw ids from one shared `IdGenerator`, owned by the `UnifiedModel`
//! (one per engine, one per test).

mod components;
mod resources;
mod workflows;

pub use components::ComponentRegistry;
pub use resources::ResourceRegistry;
pub use workflows::WorkflowRegistry;

use std::sync::Arc;

use serde::Serialize;

use crate::errors::CodegenError;
use crate::ids::{EntityId, IdGenerator};

/// What happened when an entity was offered to a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No match; the entity was appended.
    Inserted,
    /// Matched; the stored entity was kept as is.
    Kept,
    /// Matched; the stored entity's fields were overwritten.
    Replaced,
    /// Matched; empty stored fields were filled from the incoming entity.
    Merged,
}

impl MergeOutcome {
    pub fn is_new(self) -> bool {
        self == Self::Inserted
    }
}

/// Result of registering an entity: the id it is now stored under, what the
/// registry did, and any near-miss matches worth surfacing.
#[derive(Debug)]
pub struct Registration {
    pub id: EntityId,
    pub outcome: MergeOutcome,
    pub warnings: Vec<CodegenError>,
}

impl Registration {
    pub(crate) fn new(id: EntityId, outcome: MergeOutcome) -> Self {
        Self {
            id,
            outcome,
            warnings: Vec::new(),
        }
    }
}

/// The three registries plus the id generator they share.
#[derive(Debug)]
pub struct UnifiedModel {
    ids: Arc<IdGenerator>,
    pub components: ComponentRegistry,
    pub resources: ResourceRegistry,
    pub workflows: WorkflowRegistry,
}

impl UnifiedModel {
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::shared())
    }

    pub fn with_ids(ids: Arc<IdGenerator>) -> Self {
        Self {
            components: ComponentRegistry::new(Arc::clone(&ids)),
            resources: ResourceRegistry::new(Arc::clone(&ids)),
            workflows: WorkflowRegistry::new(),
            ids,
        }
    }

    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.resources.is_empty() && self.workflows.is_empty()
    }

    /// Recompute `latest` flags on components and resources.
    pub fn resolve_latest(&mut self) {
        self.components.resolve_latest();
        self.resources.resolve_latest();
    }
}

impl Default for UnifiedModel {
    fn default() -> Self {
        Self::new()
    }
}
