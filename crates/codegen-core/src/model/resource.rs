//! Resources: individual API operations identified by method + path.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{remap_id, IdRemap};
use crate::ids::EntityId;
use crate::text::{remove_whitespace_and_caps, to_camel_case};

/// Protocol bitmask. A resource may carry more than one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(pub u32);

impl ResourceType {
    pub const HTTP: Self = Self(1);
    pub const GRPC: Self = Self(2);
    pub const ASYNC: Self = Self(4);
    pub const WEBSOCKET: Self = Self(8);
    pub const GRAPHQL: Self = Self(16);
    pub const SOAP: Self = Self(32);
    pub const RPC: Self = Self(64);
    /// Hierarchy marker: groups child resources, is not itself invocable.
    pub const FOLDER: Self = Self(1024);

    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for ResourceType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIn {
    #[default]
    Path,
    Header,
    Cookie,
    Query,
}

impl fmt::Display for QueryIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Query => "query",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    pub r#in: QueryIn,
    pub description: String,
    pub required: bool,
    pub r#type: String,
    pub format: String,
    pub variable_name_value: String,
    pub variable_name_key: String,
    pub value: String,
    /// Components created for object/array parameters.
    pub components: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub required: bool,
    pub content_type: String,
    /// Source reference (e.g. `#/components/requestBodies/Pet`), if any.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Short content kind: json, xml, form, ...
    pub r#type: String,
    pub default: bool,
    pub schema: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub status: String,
    pub description: String,
    pub bodies: Vec<ResponseBody>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseBody {
    pub media_type: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub default: bool,
    pub schema: Option<EntityId>,
    pub example: String,
}

/// Identity key a workflow step uses to point at a resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: EntityId,
    pub resource_id: String,
    #[serde(default)]
    pub owner: String,
}

impl ResourceRef {
    pub fn key(&self) -> (&str, &str) {
        (&self.resource_id, &self.owner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: EntityId,
    pub path: String,
    /// `method:normalized/path`, see [`make_unique_id`].
    #[serde(default)]
    pub resource_id: String,
    /// First path segment; groups sub-resources.
    #[serde(default)]
    pub root: String,
    pub method: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub responses: Vec<Response>,
    #[serde(default)]
    pub components: Vec<EntityId>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Loader-defined provenance ("openapi", "collection", ...).
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_doc: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub latest: bool,
}

impl Resource {
    pub fn resource_ref(&self) -> ResourceRef {
        ResourceRef {
            id: self.id,
            resource_id: self.resource_id.clone(),
            owner: self.owner.clone(),
        }
    }

    /// Identity used for lookups and dedup.
    pub fn key(&self) -> (&str, &str) {
        (&self.resource_id, &self.owner)
    }

    /// Every component id reachable in one hop from this resource.
    pub fn component_ids(&self) -> Vec<EntityId> {
        let mut out = self.components.clone();
        for p in &self.parameters {
            out.extend(p.components.iter().copied());
        }
        out.extend(self.requests.iter().filter_map(|r| r.schema));
        for r in &self.responses {
            out.extend(r.bodies.iter().filter_map(|b| b.schema));
        }
        out
    }

    pub fn remap_components(&mut self, remap: &IdRemap) {
        for id in &mut self.components {
            remap_id(id, remap);
        }
        for p in &mut self.parameters {
            for id in &mut p.components {
                remap_id(id, remap);
            }
        }
        for r in &mut self.requests {
            if let Some(id) = r.schema.as_mut() {
                remap_id(id, remap);
            }
        }
        for r in &mut self.responses {
            for b in &mut r.bodies {
                if let Some(id) = b.schema.as_mut() {
                    remap_id(id, remap);
                }
            }
        }
    }

    /// Field-union merge. Scalars already set on `self` win; collections
    /// gain members `self` does not have yet.
    pub fn absorb(&mut self, incoming: &Resource) {
        fill(&mut self.name, &incoming.name);
        fill(&mut self.description, &incoming.description);
        fill(&mut self.summary, &incoming.summary);
        fill(&mut self.source, &incoming.source);
        fill(&mut self.source_doc, &incoming.source_doc);
        fill(&mut self.version, &incoming.version);
        self.resource_type = self.resource_type | incoming.resource_type;
        self.latest |= incoming.latest;

        for p in &incoming.parameters {
            if !self
                .parameters
                .iter()
                .any(|mine| mine.name == p.name && mine.r#in == p.r#in)
            {
                self.parameters.push(p.clone());
            }
        }
        for r in &incoming.requests {
            if !self
                .requests
                .iter()
                .any(|mine| mine.content_type == r.content_type)
            {
                self.requests.push(r.clone());
            }
        }
        for r in &incoming.responses {
            if !self.responses.iter().any(|mine| mine.status == r.status) {
                self.responses.push(r.clone());
            }
        }
        for id in &incoming.components {
            if !self.components.contains(id) {
                self.components.push(*id);
            }
        }
        for (k, v) in &incoming.variables {
            self.variables.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

/// Caller-supplied fields for a new resource. The registry assigns the id
/// and derives `resource_id` and `root`.
#[derive(Debug, Clone, Default)]
pub struct ResourceDraft {
    pub path: String,
    pub method: String,
    pub name: String,
    pub description: String,
    pub summary: String,
    pub source: String,
    pub source_doc: String,
    pub version: String,
    pub owner: String,
    pub deprecated: bool,
    pub latest: bool,
    pub resource_type: ResourceType,
}

impl ResourceDraft {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            ..Self::default()
        }
    }
}

impl From<&Resource> for ResourceDraft {
    fn from(r: &Resource) -> Self {
        Self {
            path: r.path.clone(),
            method: r.method.clone(),
            name: r.name.clone(),
            description: r.description.clone(),
            summary: r.summary.clone(),
            source: r.source.clone(),
            source_doc: r.source_doc.clone(),
            version: r.version.clone(),
            owner: r.owner.clone(),
            deprecated: r.deprecated,
            latest: r.latest,
            resource_type: r.resource_type,
        }
    }
}

fn path_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("static path variable regex"))
}

/// Derive the unique resource id from a path and method.
///
/// - everything from the first `?` on is dropped (query parameters do not
///   identify a resource)
/// - a leading `/` is removed
/// - `{param}` tokens lose their braces
/// - the result is prefixed with `method:`
///
/// `("/users/{userId}/orders", "get")` -> `get:users/userId/orders`
pub fn make_unique_id(path: &str, method: &str) -> String {
    let mut s = path;
    if let Some(idx) = path.find('?') {
        if idx > 0 {
            s = &path[..idx];
        }
    }
    if let Some(stripped) = s.strip_prefix('/') {
        s = stripped;
    }

    let s = path_var_re().replace_all(s, "$1");
    format!("{method}:{s}")
}

/// Root path of a resource: the leading `/segment`, or the whole path when
/// there is no second segment.
///
/// `/users/{id}/grades` -> `/users`
pub fn resource_root(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('/') {
        if let Some(idx) = rest.find('/') {
            if idx > 0 {
                return path[..idx + 1].to_string();
            }
        }
    }
    path.to_string()
}

/// Build a resource name. With no explicit `name` it is synthesized from the
/// method and path (or `sub_path` when it is more than `/`).
pub fn make_resource_name(name: &str, method: &str, path: &str, sub_path: &str) -> String {
    if name.is_empty() {
        let p = if sub_path.is_empty() || sub_path == "/" {
            path
        } else {
            sub_path
        };
        to_camel_case(&format!("{method}{}", remove_whitespace_and_caps(p)), false)
    } else {
        to_camel_case(&remove_whitespace_and_caps(name), false)
    }
}

fn fill(dst: &mut String, src: &str) {
    if dst.is_empty() && !src.is_empty() {
        *dst = src.to_string();
    }
}
