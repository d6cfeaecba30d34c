//! Workflows: ordered resource invocations with parameter/output wiring.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::resource::ResourceRef;
use super::{remap_id, IdRemap};
use crate::errors::{CodegenError, CodegenResult};
use crate::ids::EntityId;

/// A runtime expression (success criteria, output derivation).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expression {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub id: String,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowParameter {
    pub name: String,
    pub r#in: String,
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target: String,
}

/// Unique within the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
}

/// What a step invokes: exactly one resource or one nested step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTarget {
    Resource(ResourceRef),
    Step(Box<Step>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub target: StepTarget,
    #[serde(default)]
    pub parameters: BTreeMap<String, WorkflowParameter>,
    /// Ids of steps that must complete before this one.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Output>,
    #[serde(default)]
    pub success_criteria: Vec<Expression>,
    #[serde(default)]
    pub on_success: Vec<Action>,
    #[serde(default)]
    pub on_failure: Vec<Action>,
}

impl Step {
    pub fn new(id: impl Into<String>, target: StepTarget) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            target,
            parameters: BTreeMap::new(),
            depends_on: Vec::new(),
            outputs: BTreeMap::new(),
            success_criteria: Vec::new(),
            on_success: Vec::new(),
            on_failure: Vec::new(),
        }
    }

    /// The resource this step ends up invoking, following nested steps.
    pub fn resource_ref(&self) -> &ResourceRef {
        match &self.target {
            StepTarget::Resource(r) => r,
            StepTarget::Step(inner) => inner.resource_ref(),
        }
    }

    fn remap_resources(&mut self, remap: &IdRemap) {
        match &mut self.target {
            StepTarget::Resource(r) => remap_id(&mut r.id, remap),
            StepTarget::Step(inner) => inner.remap_resources(remap),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Components describing the inputs a caller supplies.
    #[serde(default)]
    pub inputs: Vec<EntityId>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Output>,
}

impl Workflow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            inputs: Vec::new(),
            steps: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Structural checks: non-empty ids, step ids unique, `depends_on` only
    /// names steps of this workflow.
    pub fn validate(&self) -> CodegenResult<()> {
        if self.id.is_empty() {
            return Err(CodegenError::validation("workflow", "id must not be empty"));
        }

        let mut seen = BTreeSet::new();
        for step in &self.steps {
            if step.id.is_empty() {
                return Err(CodegenError::validation(
                    "workflow",
                    format!("workflow {}: step id must not be empty", self.id),
                ));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(CodegenError::validation(
                    "workflow",
                    format!("workflow {}: duplicate step id {}", self.id, step.id),
                ));
            }
        }

        for step in &self.steps {
            if let Some(missing) = step.depends_on.iter().find(|d| !seen.contains(d.as_str())) {
                return Err(CodegenError::validation(
                    "workflow",
                    format!(
                        "workflow {}: step {} depends on unknown step {missing}",
                        self.id, step.id
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Every resource the steps reference, in step order.
    pub fn resource_refs(&self) -> impl Iterator<Item = &ResourceRef> + '_ {
        self.steps.iter().map(Step::resource_ref)
    }

    pub fn remap(&mut self, resources: &IdRemap, components: &IdRemap) {
        for id in &mut self.inputs {
            remap_id(id, components);
        }
        for step in &mut self.steps {
            step.remap_resources(resources);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn rref(id: u64, rid: &str) -> ResourceRef {
        ResourceRef {
            id: EntityId(id),
            resource_id: rid.to_string(),
            owner: String::new(),
        }
    }

    #[test]
    fn nested_step_resolves_to_inner_resource() {
        let inner = Step::new("inner", StepTarget::Resource(rref(3, "get:pets")));
        let outer = Step::new("outer", StepTarget::Step(Box::new(inner)));
        assert_eq!(outer.resource_ref().resource_id, "get:pets");
    }

    #[test]
    fn validate_rejects_unknown_dependency() {
        let mut step = Step::new("b", StepTarget::Resource(rref(1, "get:a")));
        step.depends_on.push("a".into());
        let mut wf = Workflow::new("wf");
        wf.steps.push(step);

        let err = wf.validate().unwrap_err();
        assert_matches!(err, CodegenError::Validation { entity: "workflow", .. });
    }

    #[test]
    fn validate_rejects_duplicate_step_ids() {
        let mut wf = Workflow::new("wf");
        wf.steps.push(Step::new("a", StepTarget::Resource(rref(1, "get:a"))));
        wf.steps.push(Step::new("a", StepTarget::Resource(rref(2, "get:b"))));
        assert!(wf.validate().is_err());
    }

    #[test]
    fn remap_touches_inputs_and_nested_targets() {
        let inner = Step::new("inner", StepTarget::Resource(rref(3, "get:pets")));
        let mut wf = Workflow::new("wf");
        wf.inputs.push(EntityId(10));
        wf.steps.push(Step::new("outer", StepTarget::Step(Box::new(inner))));

        let resources = IdRemap::from([(EntityId(3), EntityId(30))]);
        let components = IdRemap::from([(EntityId(10), EntityId(11))]);
        wf.remap(&resources, &components);

        assert_eq!(wf.inputs, vec![EntityId(11)]);
        assert_eq!(wf.steps[0].resource_ref().id, EntityId(30));
    }
}
