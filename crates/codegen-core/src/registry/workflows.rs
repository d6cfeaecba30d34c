use tracing::info;

use crate::errors::CodegenResult;
use crate::model::{IdRemap, Workflow};
use crate::targets;

/// Workflows, unique by id, in insertion order.
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    items: Vec<Workflow>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a workflow. A workflow whose id is already present is
    /// discarded and `Ok(false)` returned without being validated; the
    /// first one stays.
    pub fn add_workflow(&mut self, workflow: Workflow) -> CodegenResult<bool> {
        if self.items.iter().any(|w| w.id == workflow.id) {
            info!(
                target: targets::CORE,
                id = %workflow.id,
                "workflow already exists and can not be added"
            );
            return Ok(false);
        }

        workflow.validate()?;
        self.items.push(workflow);
        Ok(true)
    }

    pub fn find(&self, id: &str) -> Option<&Workflow> {
        self.items.iter().find(|w| w.id == id)
    }

    pub fn remap(&mut self, resources: &IdRemap, components: &IdRemap) {
        for w in &mut self.items {
            w.remap(resources, components);
        }
    }

    pub fn all(&self) -> &[Workflow] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workflow> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CodegenError;
    use assert_matches::assert_matches;

    #[test]
    fn duplicate_id_keeps_first() {
        let mut r = WorkflowRegistry::new();
        let mut first = Workflow::new("checkout");
        first.description = "first".into();
        let mut second = Workflow::new("checkout");
        second.description = "second".into();

        assert!(r.add_workflow(first).unwrap());
        assert!(!r.add_workflow(second).unwrap());
        assert_eq!(r.len(), 1);
        assert_eq!(r.find("checkout").unwrap().description, "first");
    }

    #[test]
    fn invalid_duplicate_is_a_noop() {
        let mut r = WorkflowRegistry::new();
        assert!(r.add_workflow(Workflow::new("checkout")).unwrap());

        let mut broken = Workflow::new("checkout");
        broken.steps.push(crate::model::Step::new(
            "",
            crate::model::StepTarget::Resource(crate::model::ResourceRef {
                id: crate::ids::EntityId(1),
                resource_id: "get:pets".into(),
                owner: String::new(),
            }),
        ));
        assert!(broken.validate().is_err());

        assert_matches!(r.add_workflow(broken), Ok(false));
        assert_eq!(r.len(), 1);
        assert!(r.find("checkout").unwrap().steps.is_empty());
    }

    #[test]
    fn empty_id_rejected() {
        let mut r = WorkflowRegistry::new();
        assert_matches!(
            r.add_workflow(Workflow::new("")),
            Err(CodegenError::Validation { entity: "workflow", .. })
        );
        assert!(r.is_empty());
    }
}
