//! In-memory workflow store
//!
//! Deterministic and test-friendly; everything is lost on drop.

use crate::store::WorkflowStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};
use workflow_types::{Workflow, WorkflowError, WorkflowId, WorkflowResult};

#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> WorkflowError {
    WorkflowError::Storage("workflows lock poisoned".to_string())
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn get_workflow(&self, id: &WorkflowId) -> WorkflowResult<Option<Workflow>> {
        let guard = self.workflows.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    async fn list_workflows(&self) -> WorkflowResult<Vec<Workflow>> {
        let guard = self.workflows.read().map_err(|_| poisoned())?;
        let mut workflows: Vec<Workflow> = guard.values().cloned().collect();
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workflows)
    }

    async fn create_workflow(&self, mut workflow: Workflow) -> WorkflowResult<Workflow> {
        workflow.validate()?;

        let mut guard = self.workflows.write().map_err(|_| poisoned())?;
        if guard.contains_key(&workflow.id) {
            return Err(WorkflowError::Conflict(format!(
                "workflow {} already exists",
                workflow.id
            )));
        }

        workflow.revision = 1;
        guard.insert(workflow.id.clone(), workflow.clone());
        info!(workflow_id = %workflow.id, name = %workflow.name, "Workflow created");
        Ok(workflow)
    }

    async fn update_workflow(
        &self,
        mut workflow: Workflow,
        expected_revision: u64,
    ) -> WorkflowResult<Workflow> {
        workflow.validate()?;

        let mut guard = self.workflows.write().map_err(|_| poisoned())?;
        let stored = guard
            .get_mut(&workflow.id)
            .ok_or_else(|| WorkflowError::WorkflowNotFound(workflow.id.clone()))?;

        if stored.revision != expected_revision {
            return Err(WorkflowError::Conflict(format!(
                "workflow {} is at revision {}, expected {}",
                workflow.id, stored.revision, expected_revision
            )));
        }

        workflow.revision = expected_revision + 1;
        workflow.touch();
        *stored = workflow.clone();
        debug!(
            workflow_id = %workflow.id,
            revision = workflow.revision,
            "Workflow updated"
        );
        Ok(workflow)
    }

    async fn delete_workflow(&self, id: &WorkflowId) -> WorkflowResult<Workflow> {
        let mut guard = self.workflows.write().map_err(|_| poisoned())?;
        let removed = guard
            .remove(id)
            .ok_or_else(|| WorkflowError::WorkflowNotFound(id.clone()))?;
        info!(workflow_id = %id, "Workflow deleted");
        Ok(removed)
    }
}
