//! Folding a loader's partial model into the unified model.
//!
//! Loader ids are local to the partial model, so the merge runs in phases:
//!
//! 1. give every incoming component, property and resource a fresh id from
//!    the engine's generator and rewrite all references to match
//! 2. register components; a merged component's fresh id is mapped to the
//!    stored id and references are rewritten again
//! 3. register resources the same way, by identity (`resource_id`, `owner`)
//! 4. add workflows, whose step targets now carry final resource ids
//!
//! Fresh ids never collide with stored ones, so a rewrite can never touch a
//! reference that was already stored.

use serde::Serialize;
use tracing::warn;

use codegen_core::config::MergePolicy;
use codegen_core::diagnostics::Diagnostic;
use codegen_core::ids::EntityId;
use codegen_core::model::IdRemap;
use codegen_core::registry::{MergeOutcome, UnifiedModel};
use codegen_core::targets;

use crate::plugin::LoaderResources;

/// Counts of what a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub components_added: usize,
    pub components_merged: usize,
    pub resources_added: usize,
    pub resources_merged: usize,
    pub workflows_added: usize,
    pub workflows_skipped: usize,
    pub rejected: usize,
}

impl MergeSummary {
    pub fn add(&mut self, other: &MergeSummary) {
        self.components_added += other.components_added;
        self.components_merged += other.components_merged;
        self.resources_added += other.resources_added;
        self.resources_merged += other.resources_merged;
        self.workflows_added += other.workflows_added;
        self.workflows_skipped += other.workflows_skipped;
        self.rejected += other.rejected;
    }
}

pub fn merge_into(
    model: &mut UnifiedModel,
    incoming: LoaderResources,
    policy: MergePolicy,
) -> (MergeSummary, Vec<Diagnostic>) {
    let LoaderResources {
        mut resources,
        mut components,
        mut workflows,
    } = incoming;
    let mut summary = MergeSummary::default();
    let mut diagnostics = Vec::new();

    // 1. fresh ids, one per incoming entity. A repeated loader id maps to
    // the first entity that carried it.
    let ids = model.ids().clone();
    let mut component_fresh = IdRemap::new();
    for c in &mut components {
        let fresh = ids.next_id();
        if component_fresh.contains_key(&c.id) {
            diagnostics.push(duplicate_id("component", c.id, &c.name));
        } else {
            component_fresh.insert(c.id, fresh);
        }
        c.id = fresh;
        c.assign_property_ids(&ids);
    }
    let mut resource_fresh = IdRemap::new();
    for r in &mut resources {
        let fresh = ids.next_id();
        if resource_fresh.contains_key(&r.id) {
            diagnostics.push(duplicate_id("resource", r.id, &r.path));
        } else {
            resource_fresh.insert(r.id, fresh);
        }
        r.id = fresh;
    }

    for c in &mut components {
        c.remap_refs(&component_fresh);
    }
    for r in &mut resources {
        r.remap_components(&component_fresh);
    }
    for w in &mut workflows {
        w.remap(&resource_fresh, &component_fresh);
    }

    // 2. components
    let mut component_dedup = IdRemap::new();
    for c in components {
        let fresh = c.id;
        let name = c.name.clone();
        match model.components.insert(c, policy) {
            Ok(reg) => {
                if reg.outcome.is_new() {
                    summary.components_added += 1;
                } else {
                    summary.components_merged += 1;
                    component_dedup.insert(fresh, reg.id);
                }
                diagnostics.extend(reg.warnings.iter().map(Diagnostic::from));
            }
            Err(e) => {
                warn!(target: targets::CORE, component = %name, "component rejected: {e}");
                summary.rejected += 1;
                diagnostics.push(Diagnostic::from(&e));
            }
        }
    }
    model.components.remap_refs(&component_dedup);
    for r in &mut resources {
        r.remap_components(&component_dedup);
    }

    // 3. resources
    let mut resource_dedup = IdRemap::new();
    for r in resources {
        let fresh = r.id;
        let path = r.path.clone();
        match model.resources.merge(r, policy) {
            Ok(reg) => {
                if reg.outcome == MergeOutcome::Inserted {
                    summary.resources_added += 1;
                } else {
                    summary.resources_merged += 1;
                    resource_dedup.insert(fresh, reg.id);
                }
            }
            Err(e) => {
                warn!(target: targets::CORE, path = %path, "resource rejected: {e}");
                summary.rejected += 1;
                diagnostics.push(Diagnostic::from(&e));
            }
        }
    }

    // 4. workflows
    for mut w in workflows {
        w.remap(&resource_dedup, &component_dedup);
        let id = w.id.clone();
        match model.workflows.add_workflow(w) {
            Ok(true) => summary.workflows_added += 1,
            Ok(false) => {
                summary.workflows_skipped += 1;
                diagnostics.push(
                    Diagnostic::info("workflow.duplicate", "workflow already exists")
                        .with("workflow", id),
                );
            }
            Err(e) => {
                warn!(target: targets::CORE, workflow = %id, "workflow rejected: {e}");
                summary.rejected += 1;
                diagnostics.push(Diagnostic::from(&e));
            }
        }
    }

    (summary, diagnostics)
}

fn duplicate_id(entity: &str, id: EntityId, name: &str) -> Diagnostic {
    warn!(target: targets::CORE, entity, id = %id, name, "duplicate id in loader output");
    Diagnostic::warning(
        "merge.duplicate_id",
        format!("{entity} id {id} appears more than once, references resolve to the first"),
    )
    .with("entity", entity)
    .with("name", name)
}
