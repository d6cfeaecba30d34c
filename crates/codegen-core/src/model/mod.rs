//! The canonical, source-independent data model.
//!
//! Loaders translate source documents (OpenAPI, collections, workflow specs)
//! into these types; generators read them back out. The model is mostly
//! plain data. Identity, deduplication and ordering rules live in
//! `crate::registry`, which is the only place entities are created.
//!
//! Cross-entity links are ids, not pointers:
//! - a component or property refers to another component by `EntityId`
//! - parameters, requests and responses hold the ids of their schemas
//! - a workflow step holds a `ResourceRef` (id + identity key)

pub mod component;
pub mod property;
pub mod resource;
pub mod workflow;

pub use component::{Component, ComponentDraft, ComponentRef, ComponentSource};
pub use property::{Property, PropertyDraft};
pub use resource::{
    make_resource_name, make_unique_id, resource_root, Parameter, QueryIn, Request, Resource,
    ResourceDraft, ResourceRef, ResourceType, Response, ResponseBody,
};
pub use workflow::{
    Action, Expression, Output, Step, StepTarget, Workflow, WorkflowParameter,
};

use std::collections::BTreeMap;

use crate::ids::EntityId;

/// Old id -> new id, produced when entities are re-registered or merged.
pub type IdRemap = BTreeMap<EntityId, EntityId>;

pub(crate) fn remap_id(id: &mut EntityId, remap: &IdRemap) {
    if let Some(new) = remap.get(id) {
        *id = *new;
    }
}
