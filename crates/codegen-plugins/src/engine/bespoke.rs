//! Bespoke workflow reduction.
//!
//! Shrinks the model to the resources workflow steps invoke and the
//! components reachable from them:
//! - a step's resource is found by identity (`resource_id`, `owner`),
//!   falling back to its id
//! - a resource contributes the schemas of its parameters, requests,
//!   responses and its own component list
//! - workflow inputs are kept
//! - reachability is transitive through `ref` and nested property refs

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use codegen_core::ids::EntityId;
use codegen_core::registry::UnifiedModel;
use codegen_core::targets;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BespokeSummary {
    pub resources_before: usize,
    pub resources_after: usize,
    pub components_before: usize,
    pub components_after: usize,
}

pub fn reduce_to_workflows(model: &mut UnifiedModel) -> BespokeSummary {
    let mut summary = BespokeSummary {
        resources_before: model.resources.len(),
        components_before: model.components.len(),
        ..BespokeSummary::default()
    };

    let mut keys: BTreeSet<(String, String)> = BTreeSet::new();
    let mut frontier: Vec<EntityId> = Vec::new();

    for w in model.workflows.iter() {
        frontier.extend(w.inputs.iter().copied());

        for step in &w.steps {
            let r = step.resource_ref();
            let found = model
                .resources
                .find_by_ref(r)
                .or_else(|| model.resources.find_by_id(r.id));
            let Some(resource) = found else {
                warn!(
                    target: targets::CORE,
                    workflow = %w.id,
                    step = %step.id,
                    resource_id = %r.resource_id,
                    "step references an unknown resource"
                );
                continue;
            };

            if keys.insert((resource.resource_id.clone(), resource.owner.clone())) {
                frontier.extend(resource.component_ids());
            }
        }
    }

    let mut reachable: BTreeSet<EntityId> = BTreeSet::new();
    while let Some(id) = frontier.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(c) = model.components.find_by_id(id) {
            frontier.extend(c.referenced_ids());
        }
    }

    model.resources.retain_keys(&keys);
    model.components.retain_ids(&reachable);

    summary.resources_after = model.resources.len();
    summary.components_after = model.components.len();
    info!(
        target: targets::CORE,
        resources = summary.resources_after,
        components = summary.components_after,
        "reduced model to workflow usage"
    );
    summary
}
