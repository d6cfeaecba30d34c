//! Components: reusable or inline payload/schema definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::property::Property;
use super::{remap_id, IdRemap};
use crate::ids::{EntityId, IdGenerator};
use crate::text::eq_fold;

/// Where a component was found in its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSource {
    #[default]
    Unknown,
    /// A named, reusable definition.
    Defined,
    /// An object-typed request parameter.
    Parameter,
    Inline,
    Reference,
    RequestBodyInline,
    ResponseBodyInline,
    Property,
}

impl ComponentSource {
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            Self::Inline | Self::RequestBodyInline | Self::ResponseBodyInline
        )
    }
}

impl fmt::Display for ComponentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Defined => "Defined Component",
            Self::Inline => "Inlined Component",
            Self::Parameter => "Parameter Component",
            Self::Property => "Property Component",
            Self::Reference => "Reference Component",
            Self::RequestBodyInline => "Request Body Inlined Component",
            Self::ResponseBodyInline => "Response Body Inlined Component",
            Self::Unknown => "Unknown Component Type",
        };
        f.write_str(s)
    }
}

/// What `ref` points at. Objects reference another component; arrays and
/// aliases name a primitive type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ComponentRef {
    Component(EntityId),
    Primitive(String),
}

impl ComponentRef {
    pub fn component_id(&self) -> Option<EntityId> {
        match self {
            Self::Component(id) => Some(*id),
            Self::Primitive(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: EntityId,
    pub name: String,
    /// Name as it appears in the source document.
    #[serde(default)]
    pub raw_name: String,
    /// object, array, string, number, enum
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub description: String,
    /// Primitive sub-type (int64, float, email, ...).
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub null: Option<bool>,
    #[serde(default)]
    pub enums: Vec<String>,
    #[serde(default)]
    pub source: ComponentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<ComponentRef>,
    /// Document the component came from. Components from different
    /// documents are never merged.
    #[serde(default)]
    pub source_doc: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub latest: bool,
    /// Kept sorted by name.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Component {
    /// Full dedup match: name (case-insensitive), source kind, format,
    /// required flag and the same non-empty source document.
    pub fn matches(&self, other: &Component) -> bool {
        eq_fold(&self.name, &other.name)
            && self.source == other.source
            && self.format == other.format
            && self.required == other.required
            && same_source_doc(&self.source_doc, &other.source_doc)
    }

    /// Fields that differ when two components share a name and source
    /// document but do not fully match. Empty if they are unrelated or match.
    pub fn conflicting_fields(&self, other: &Component) -> Vec<&'static str> {
        if !eq_fold(&self.name, &other.name)
            || !same_source_doc(&self.source_doc, &other.source_doc)
        {
            return Vec::new();
        }

        let mut fields = Vec::new();
        if self.source != other.source {
            fields.push("source");
        }
        if self.format != other.format {
            fields.push("format");
        }
        if self.required != other.required {
            fields.push("required");
        }
        fields
    }

    /// Every component id this component refers to directly, including
    /// through nested properties.
    pub fn referenced_ids(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        if let Some(id) = self.reference.as_ref().and_then(ComponentRef::component_id) {
            out.push(id);
        }
        for p in &self.properties {
            p.collect_referenced_ids(&mut out);
        }
        out
    }

    pub fn remap_refs(&mut self, remap: &IdRemap) {
        if let Some(ComponentRef::Component(id)) = self.reference.as_mut() {
            remap_id(id, remap);
        }
        for p in &mut self.properties {
            p.remap_refs(remap);
        }
    }

    /// Give every property, nested ones included, a fresh id from `ids`.
    pub fn assign_property_ids(&mut self, ids: &IdGenerator) {
        for p in &mut self.properties {
            p.assign_ids(ids);
        }
    }

    /// Field-union merge: keep every populated field of `self`, fill empty
    /// ones from `incoming`, add properties `self` lacks.
    pub fn absorb(&mut self, incoming: &Component) {
        fill(&mut self.raw_name, &incoming.raw_name);
        fill(&mut self.r#type, &incoming.r#type);
        fill(&mut self.description, &incoming.description);
        fill(&mut self.version, &incoming.version);
        if self.null.is_none() {
            self.null = incoming.null;
        }
        if self.enums.is_empty() {
            self.enums = incoming.enums.clone();
        }
        if self.raw.is_none() {
            self.raw = incoming.raw.clone();
        }
        if self.reference.is_none() {
            self.reference = incoming.reference.clone();
        }
        for p in &incoming.properties {
            if !self
                .properties
                .iter()
                .any(|mine| eq_fold(&mine.name, &p.name))
            {
                self.properties.push(p.clone());
            }
        }
        self.properties.sort_by(|a, b| a.name.cmp(&b.name));
        self.latest |= incoming.latest;
    }
}

/// Caller-supplied fields for a new component. The registry assigns the id.
#[derive(Debug, Clone, Default)]
pub struct ComponentDraft {
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
    pub source: ComponentSource,
    pub reference: Option<ComponentRef>,
    pub raw: Option<Value>,
    pub source_doc: String,
    pub properties: Vec<Property>,
}

impl ComponentDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn build(self, id: EntityId) -> Component {
        let mut properties = self.properties;
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        Component {
            id,
            name: self.name,
            raw_name: self.raw_name,
            r#type: self.r#type,
            description: self.description,
            format: self.format,
            required: self.required,
            null: self.null,
            enums: self.enums,
            source: self.source,
            raw: self.raw,
            reference: self.reference,
            source_doc: self.source_doc,
            version: self.version,
            latest: self.latest,
            properties,
        }
    }
}

impl From<Component> for ComponentDraft {
    fn from(c: Component) -> Self {
        Self {
            name: c.name,
            raw_name: c.raw_name,
            r#type: c.r#type,
            description: c.description,
            format: c.format,
            version: c.version,
            required: c.required,
            null: c.null,
            latest: c.latest,
            enums: c.enums,
            source: c.source,
            reference: c.reference,
            raw: c.raw,
            source_doc: c.source_doc,
            properties: c.properties,
        }
    }
}

fn same_source_doc(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && eq_fold(a, b)
}

fn fill(dst: &mut String, src: &str) {
    if dst.is_empty() && !src.is_empty() {
        *dst = src.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(name: &str, doc: &str) -> Component {
        ComponentDraft {
            source: ComponentSource::Defined,
            source_doc: doc.to_string(),
            ..ComponentDraft::new(name)
        }
        .build(EntityId(1))
    }

    #[test]
    fn match_is_case_insensitive_on_name_and_doc() {
        let a = comp("Pet", "petstore.yaml");
        let b = comp("pet", "PETSTORE.yaml");
        assert!(a.matches(&b));
    }

    #[test]
    fn match_folds_non_ascii_case() {
        assert!(comp("Änderung", "Katalog").matches(&comp("änderung", "KATALOG")));
    }

    #[test]
    fn empty_source_doc_never_matches() {
        let a = comp("Pet", "");
        let b = comp("Pet", "");
        assert!(!a.matches(&b));
    }

    #[test]
    fn conflicting_fields_reported_for_partial_match() {
        let a = comp("Pet", "doc");
        let mut b = comp("Pet", "doc");
        b.format = "int64".into();
        b.required = Some(true);
        assert_eq!(a.conflicting_fields(&b), vec!["format", "required"]);
        assert!(a.conflicting_fields(&comp("Owner", "doc")).is_empty());
    }

    #[test]
    fn absorb_fills_only_empty_fields() {
        let mut a = comp("Pet", "doc");
        a.description = "kept".into();
        let mut b = comp("Pet", "doc");
        b.description = "dropped".into();
        b.r#type = "object".into();
        a.absorb(&b);
        assert_eq!(a.description, "kept");
        assert_eq!(a.r#type, "object");
    }

    #[test]
    fn source_display_strings() {
        assert_eq!(ComponentSource::Defined.to_string(), "Defined Component");
        assert!(ComponentSource::ResponseBodyInline.is_inline());
        assert!(!ComponentSource::Parameter.is_inline());
    }
}
