use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{MergeOutcome, Registration};
use crate::config::MergePolicy;
use crate::errors::{CodegenError, CodegenResult};
use crate::ids::{EntityId, IdGenerator};
use crate::model::{
    make_unique_id, resource_root, IdRemap, Resource, ResourceDraft, ResourceRef,
};
use crate::targets;
use crate::text::eq_fold;
use crate::version::{compare_versions, is_newer};

/// Canonical resource store, in insertion order.
#[derive(Debug)]
pub struct ResourceRegistry {
    ids: Arc<IdGenerator>,
    items: Vec<Resource>,
}

impl ResourceRegistry {
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self {
            ids,
            items: Vec::new(),
        }
    }

    /// Create and append a resource. No dedup happens here: callers that
    /// care look the resource up with [`find_resource`](Self::find_resource)
    /// first, or go through [`merge`](Self::merge).
    pub fn new_resource(&mut self, draft: ResourceDraft) -> CodegenResult<&Resource> {
        if draft.path.is_empty() || draft.method.is_empty() {
            return Err(CodegenError::validation(
                "resource",
                "resource must have a path and method",
            ));
        }

        let resource = Resource {
            id: self.ids.next_id(),
            resource_id: make_unique_id(&draft.path, &draft.method),
            root: resource_root(&draft.path),
            path: draft.path,
            method: draft.method,
            name: draft.name,
            description: draft.description,
            summary: draft.summary,
            deprecated: draft.deprecated,
            resource_type: draft.resource_type,
            parameters: Vec::new(),
            requests: Vec::new(),
            responses: Vec::new(),
            components: Vec::new(),
            variables: BTreeMap::new(),
            source: draft.source,
            source_doc: draft.source_doc,
            version: draft.version,
            owner: draft.owner,
            latest: draft.latest,
        };

        self.items.push(resource);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Mutable access for loaders filling in parameters, requests and
    /// responses after [`new_resource`](Self::new_resource).
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Resource> {
        self.items.iter_mut().find(|r| r.id == id)
    }

    /// Register a fully built resource, deduplicating by identity
    /// (`resource_id`, `owner`). The incoming id is kept when inserted.
    /// `resource_id` and `root` are always re-derived from path and method.
    pub fn merge(&mut self, mut incoming: Resource, policy: MergePolicy) -> CodegenResult<Registration> {
        if incoming.path.is_empty() || incoming.method.is_empty() {
            return Err(CodegenError::validation(
                "resource",
                "resource must have a path and method",
            ));
        }
        let derived = make_unique_id(&incoming.path, &incoming.method);
        if !incoming.resource_id.is_empty() && incoming.resource_id != derived {
            warn!(
                target: targets::CORE,
                supplied = %incoming.resource_id,
                derived = %derived,
                "resource_id does not match path and method, using derived"
            );
        }
        incoming.resource_id = derived;
        incoming.root = resource_root(&incoming.path);

        let Some(stored) = self.items.iter_mut().find(|r| r.key() == incoming.key()) else {
            let id = incoming.id;
            self.items.push(incoming);
            return Ok(Registration::new(id, MergeOutcome::Inserted));
        };

        let id = stored.id;
        let outcome = match policy {
            MergePolicy::KeepExisting => MergeOutcome::Kept,
            MergePolicy::Replace => {
                incoming.id = id;
                *stored = incoming;
                MergeOutcome::Replaced
            }
            MergePolicy::FieldUnion => {
                stored.absorb(&incoming);
                if is_newer(&incoming.version, &stored.version) {
                    stored.version = incoming.version;
                }
                MergeOutcome::Merged
            }
        };
        debug!(
            target: targets::CORE,
            id = %id,
            resource_id = %stored.resource_id,
            outcome = ?outcome,
            "duplicate resource"
        );
        Ok(Registration::new(id, outcome))
    }

    /// Look a resource up by identity. The path is normalized the same way
    /// `resource_id` is.
    pub fn find_resource(&self, path: &str, method: &str, owner: &str) -> Option<&Resource> {
        let rid = make_unique_id(path, method);
        self.items
            .iter()
            .find(|r| r.resource_id == rid && r.owner == owner)
    }

    pub fn find_by_ref(&self, r: &ResourceRef) -> Option<&Resource> {
        self.items.iter().find(|x| x.key() == r.key())
    }

    /// Case-insensitive name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Resource> {
        self.items.iter().find(|r| eq_fold(&r.name, name))
    }

    pub fn find_by_id(&self, id: EntityId) -> Option<&Resource> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Remove every resource with this `resource_id`, whatever its owner.
    /// Returns how many were removed.
    pub fn remove_resource(&mut self, resource_id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|r| r.resource_id != resource_id);
        before - self.items.len()
    }

    /// Group resources by `root`.
    pub fn by_hierarchy(&self) -> BTreeMap<&str, Vec<&Resource>> {
        let mut m: BTreeMap<&str, Vec<&Resource>> = BTreeMap::new();
        for r in &self.items {
            m.entry(r.root.as_str()).or_default().push(r);
        }
        m
    }

    pub fn latest(&self) -> Vec<&Resource> {
        self.items.iter().filter(|r| r.latest).collect()
    }

    /// Among resources sharing an identity, flag the highest version latest.
    pub fn resolve_latest(&mut self) {
        let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (i, r) in self.items.iter().enumerate() {
            groups
                .entry((r.resource_id.clone(), r.owner.clone()))
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
                let r = &mut self.items[i];
                r.latest = compare_versions(&r.version, &best) == Ordering::Equal;
            }
        }
    }

    pub fn remap_components(&mut self, remap: &IdRemap) {
        if remap.is_empty() {
            return;
        }
        for r in &mut self.items {
            r.remap_components(remap);
        }
    }

    /// Keep only resources whose identity is in `keep`.
    pub fn retain_keys(&mut self, keep: &BTreeSet<(String, String)>) {
        self.items
            .retain(|r| keep.contains(&(r.resource_id.clone(), r.owner.clone())));
    }

    pub fn all(&self) -> &[Resource] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
