//! Properties of components. Same shape as a component minus provenance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::component::ComponentRef;
use super::{remap_id, IdRemap};
use crate::errors::{CodegenError, CodegenResult};
use crate::ids::{EntityId, IdGenerator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub raw_name: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub null: Option<bool>,
    #[serde(default)]
    pub enums: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub latest: bool,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<ComponentRef>,
}

impl Property {
    /// Build a property with an id from the shared generator so ids stay
    /// unique across properties and components.
    pub fn new(ids: &IdGenerator, draft: PropertyDraft) -> CodegenResult<Self> {
        if draft.name.is_empty() {
            return Err(CodegenError::validation("property", "name must not be empty"));
        }

        let mut properties = draft.properties;
        properties.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            id: ids.next_id(),
            name: draft.name,
            raw_name: draft.raw_name,
            r#type: draft.r#type,
            description: draft.description,
            format: draft.format,
            required: draft.required,
            null: draft.null,
            enums: draft.enums,
            raw: draft.raw,
            properties,
            version: draft.version,
            latest: draft.latest,
            reference: draft.reference,
        })
    }

    pub(crate) fn collect_referenced_ids(&self, out: &mut Vec<EntityId>) {
        if let Some(id) = self.reference.as_ref().and_then(ComponentRef::component_id) {
            out.push(id);
        }
        for p in &self.properties {
            p.collect_referenced_ids(out);
        }
    }

    pub(crate) fn remap_refs(&mut self, remap: &IdRemap) {
        if let Some(ComponentRef::Component(id)) = self.reference.as_mut() {
            remap_id(id, remap);
        }
        for p in &mut self.properties {
            p.remap_refs(remap);
        }
    }

    /// Replace this property's id and every nested one with ids from `ids`.
    pub(crate) fn assign_ids(&mut self, ids: &IdGenerator) {
        self.id = ids.next_id();
        for p in &mut self.properties {
            p.assign_ids(ids);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyDraft {
    pub name: String,
    pub raw_name: String,
    pub r#type: String,
    pub description: String,
    pub format: String,
    pub version: String,
    pub required: Option<bool>,
    pub null: Option<bool>,
    pub latest: bool,
    pub enums: Vec<String>,
    pub reference: Option<ComponentRef>,
    pub raw: Option<Value>,
    pub properties: Vec<Property>,
}

impl PropertyDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_name_rejected() {
        let ids = IdGenerator::new();
        let err = Property::new(&ids, PropertyDraft::default()).unwrap_err();
        assert_matches!(err, CodegenError::Validation { entity: "property", .. });
    }

    #[test]
    fn assign_ids_reaches_nested_properties() {
        let scratch = IdGenerator::new();
        let inner = Property::new(&scratch, PropertyDraft::new("name")).unwrap();
        let mut outer = Property::new(
            &scratch,
            PropertyDraft {
                properties: vec![inner],
                ..PropertyDraft::new("owner")
            },
        )
        .unwrap();

        let ids = IdGenerator::starting_at(100);
        outer.assign_ids(&ids);
        assert_eq!(outer.id, EntityId(100));
        assert_eq!(outer.properties[0].id, EntityId(101));
    }

    #[test]
    fn nested_refs_collected_and_remapped() {
        let ids = IdGenerator::new();
        let inner = Property::new(
            &ids,
            PropertyDraft {
                reference: Some(ComponentRef::Component(EntityId(40))),
                ..PropertyDraft::new("owner")
            },
        )
        .unwrap();
        let mut outer = Property::new(
            &ids,
            PropertyDraft {
                properties: vec![inner],
                ..PropertyDraft::new("pet")
            },
        )
        .unwrap();

        let mut refs = Vec::new();
        outer.collect_referenced_ids(&mut refs);
        assert_eq!(refs, vec![EntityId(40)]);

        let remap = IdRemap::from([(EntityId(40), EntityId(7))]);
        outer.remap_refs(&remap);
        assert_eq!(
            outer.properties[0].reference,
            Some(ComponentRef::Component(EntityId(7)))
        );
    }
}
