//! Workflow persistence seam

use async_trait::async_trait;
use workflow_types::{Workflow, WorkflowId, WorkflowResult};

/// Async workflow store.
///
/// Writes are compare-and-swap on [`Workflow::revision`]: `update_workflow`
/// succeeds only when the stored revision equals `expected_revision`, and
/// the store bumps the revision on every successful write.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch a workflow by ID
    async fn get_workflow(&self, id: &WorkflowId) -> WorkflowResult<Option<Workflow>>;

    /// All stored workflows, ordered by ID
    async fn list_workflows(&self) -> WorkflowResult<Vec<Workflow>>;

    /// Insert a new workflow; returns the stored copy
    async fn create_workflow(&self, workflow: Workflow) -> WorkflowResult<Workflow>;

    /// Replace a workflow; returns the stored copy with its new revision
    async fn update_workflow(
        &self,
        workflow: Workflow,
        expected_revision: u64,
    ) -> WorkflowResult<Workflow>;

    /// Remove a workflow, returning it
    async fn delete_workflow(&self, id: &WorkflowId) -> WorkflowResult<Workflow>;

    /// Workflows currently accepting decisions
    async fn active_workflows(&self) -> WorkflowResult<Vec<Workflow>> {
        Ok(self
            .list_workflows()
            .await?
            .into_iter()
            .filter(Workflow::is_active)
            .collect())
    }
}
