use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{MergeOutcome, Registration};
use crate::config::MergePolicy;
use crate::errors::{CodegenError, CodegenResult};
use crate::ids::{EntityId, IdGenerator};
use crate::model::{Component, ComponentDraft, ComponentSource, IdRemap};
use crate::targets;
use crate::text::eq_fold;
use crate::version::{compare_versions, is_newer};

/// Canonical component store, kept sorted by name.
///
/// Lookups are linear scans; component counts are in the hundreds.
#[derive(Debug)]
pub struct ComponentRegistry {
    ids: Arc<IdGenerator>,
    items: Vec<Component>,
}

impl ComponentRegistry {
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self {
            ids,
            items: Vec::new(),
        }
    }

    /// Create a component, or reconcile it with a stored match.
    ///
    /// Fails only when the name is empty. A match (see
    /// [`Component::matches`]) is handled according to `policy` and the
    /// stored id is returned; otherwise the new component is appended and
    /// the collection re-sorted by name.
    pub fn new_component(
        &mut self,
        draft: ComponentDraft,
        policy: MergePolicy,
    ) -> CodegenResult<Registration> {
        if draft.name.is_empty() {
            return Err(CodegenError::validation("component", "name must not be empty"));
        }
        let candidate = draft.build(self.ids.next_id());
        Ok(self.register(candidate, policy))
    }

    /// Register an already-built component, keeping its id when inserted.
    /// Used when merging partial models whose ids were allocated upstream.
    pub fn insert(&mut self, component: Component, policy: MergePolicy) -> CodegenResult<Registration> {
        if component.name.is_empty() {
            return Err(CodegenError::validation("component", "name must not be empty"));
        }
        Ok(self.register(component, policy))
    }

    fn register(&mut self, mut candidate: Component, policy: MergePolicy) -> Registration {
        if let Some(pos) = self.items.iter().position(|c| c.matches(&candidate)) {
            let stored = &mut self.items[pos];
            let id = stored.id;
            let outcome = match policy {
                MergePolicy::KeepExisting => MergeOutcome::Kept,
                MergePolicy::Replace => {
                    candidate.id = id;
                    *stored = candidate;
                    MergeOutcome::Replaced
                }
                MergePolicy::FieldUnion => {
                    stored.absorb(&candidate);
                    if is_newer(&candidate.version, &stored.version) {
                        stored.version = candidate.version;
                    }
                    MergeOutcome::Merged
                }
            };
            debug!(
                target: targets::CORE,
                id = %id,
                outcome = ?outcome,
                "duplicate component"
            );
            if outcome == MergeOutcome::Replaced {
                self.sort();
            }
            return Registration::new(id, outcome);
        }

        let warnings = self.ambiguities(&candidate);
        for w in &warnings {
            warn!(target: targets::CORE, "{w}");
        }

        let id = candidate.id;
        self.items.push(candidate);
        self.sort();

        Registration {
            id,
            outcome: MergeOutcome::Inserted,
            warnings,
        }
    }

    fn ambiguities(&self, candidate: &Component) -> Vec<CodegenError> {
        self.items
            .iter()
            .filter_map(|c| {
                let fields = c.conflicting_fields(candidate);
                if fields.is_empty() {
                    return None;
                }
                Some(CodegenError::merge_ambiguity(
                    "component",
                    candidate.name.clone(),
                    format!(
                        "same name and source document as component {} but {} differ; kept both",
                        c.id,
                        fields.join(", ")
                    ),
                ))
            })
            .collect()
    }

    // Stable: equal names keep insertion order.
    fn sort(&mut self) {
        self.items.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// First component whose name matches case-insensitively.
    pub fn find_by_name(&self, name: &str) -> Option<&Component> {
        self.items.iter().find(|c| eq_fold(&c.name, name))
    }

    pub fn find_by_id(&self, id: EntityId) -> Option<&Component> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn find_by_comparison(&self, component: &Component) -> Option<&Component> {
        self.items.iter().find(|c| c.matches(component))
    }

    /// Stored components for the given ids, in argument order. Unknown ids
    /// are skipped.
    pub fn find_components_by_ids(&self, ids: &[EntityId]) -> Vec<&Component> {
        ids.iter().filter_map(|id| self.find_by_id(*id)).collect()
    }

    pub fn defined(&self) -> Vec<&Component> {
        self.by_source(|s| s == ComponentSource::Defined)
    }

    pub fn parameters(&self) -> Vec<&Component> {
        self.by_source(|s| s == ComponentSource::Parameter)
    }

    pub fn inlined(&self) -> Vec<&Component> {
        self.by_source(ComponentSource::is_inline)
    }

    pub fn latest(&self) -> Vec<&Component> {
        self.items.iter().filter(|c| c.latest).collect()
    }

    fn by_source(&self, pred: impl Fn(ComponentSource) -> bool) -> Vec<&Component> {
        self.items.iter().filter(|c| pred(c.source)).collect()
    }

    /// Flag the highest version within each (name, source) group as latest.
    /// Ties are all flagged.
    pub fn resolve_latest(&mut self) {
        let mut groups: HashMap<(String, ComponentSource), Vec<usize>> = HashMap::new();
        for (i, c) in self.items.iter().enumerate() {
            groups
                .entry((c.name.to_lowercase(), c.source))
                .or_default()
                .push(i);
        }

        for members in groups.values() {
            let Some(best) = members
                .iter()
                .map(|&i| self.items[i].version.as_str())
                .max_by(|a, b| compare_versions(a, b))
                .map(str::to_string)
            else {
                continue;
            };
            for &i in members {
                let c = &mut self.items[i];
                c.latest = compare_versions(&c.version, &best) == Ordering::Equal;
            }
        }
    }

    /// Rewrite every component reference through `remap`.
    pub fn remap_refs(&mut self, remap: &IdRemap) {
        if remap.is_empty() {
            return;
        }
        for c in &mut self.items {
            c.remap_refs(remap);
        }
    }

    /// Drop every component whose id is not in `keep`.
    pub fn retain_ids(&mut self, keep: &BTreeSet<EntityId>) {
        self.items.retain(|c| keep.contains(&c.id));
    }

    pub fn all(&self) -> &[Component] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
