//! Approval service: pending-approval discovery and decision processing
//! over a [`WorkflowStore`]

use crate::approval_gate::{ApprovalGate, ApproverRelation, DecisionOutcome};
use crate::store::WorkflowStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use workflow_types::{
    ApprovalType, Decision, StepId, User, WorkflowError, WorkflowId, WorkflowResult,
};

/// An approval step awaiting quorum that concerns a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    pub workflow_id: WorkflowId,
    pub workflow_name: String,
    pub step_id: StepId,
    pub step_name: String,
    pub approval_type: ApprovalType,
    pub approved: usize,
    pub required: u32,
    /// Pass back as `expected_version` when deciding
    pub version: u64,
    pub due_date: Option<DateTime<Utc>>,
    pub relation: ApproverRelation,
}

/// A decision submitted against a stored workflow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub workflow_id: WorkflowId,
    pub step_id: StepId,
    pub decision: Decision,
    #[serde(default)]
    pub comment: Option<String>,
    pub expected_version: u64,
}

impl DecisionRequest {
    pub fn new(
        workflow_id: WorkflowId,
        step_id: StepId,
        decision: Decision,
        expected_version: u64,
    ) -> Self {
        Self {
            workflow_id,
            step_id,
            decision,
            comment: None,
            expected_version,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

pub struct ApprovalService<S: WorkflowStore> {
    store: Arc<S>,
    gate: ApprovalGate,
}

impl<S: WorkflowStore> ApprovalService<S> {
    pub fn new(store: Arc<S>, gate: ApprovalGate) -> Self {
        Self { store, gate }
    }

    pub fn gate(&self) -> &ApprovalGate {
        &self.gate
    }

    /// Pending approval steps across active workflows that `user` may
    /// decide on or has already decided on
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn pending_approvals(&self, user: &User) -> WorkflowResult<Vec<PendingApproval>> {
        let workflows = self.store.active_workflows().await?;

        let mut pending = Vec::new();
        for workflow in &workflows {
            for step in workflow.approval_steps() {
                let Some(approval) = step.as_approval() else {
                    continue;
                };
                if approval.is_satisfied() {
                    continue;
                }
                let Some(relation) = self.gate.relation(approval, user) else {
                    continue;
                };
                pending.push(PendingApproval {
                    workflow_id: workflow.id.clone(),
                    workflow_name: workflow.name.clone(),
                    step_id: step.id.clone(),
                    step_name: step.name.clone(),
                    approval_type: approval.approval_type,
                    approved: approval.approved_count(),
                    required: approval.required_approvals,
                    version: approval.version,
                    due_date: approval.config.due_date,
                    relation,
                });
            }
        }

        info!(count = pending.len(), "Pending approvals collected");
        Ok(pending)
    }

    /// Load the workflow, record the decision and write it back.
    ///
    /// The write is conditioned on the revision observed at load, so a
    /// concurrent writer makes this call fail with `Conflict` rather than
    /// being overwritten.
    #[instrument(
        skip(self, user, request),
        fields(workflow_id = %request.workflow_id, step_id = %request.step_id)
    )]
    pub async fn process_approval(
        &self,
        user: Option<&User>,
        request: DecisionRequest,
    ) -> WorkflowResult<DecisionOutcome> {
        let mut workflow = self
            .store
            .get_workflow(&request.workflow_id)
            .await?
            .ok_or_else(|| WorkflowError::WorkflowNotFound(request.workflow_id.clone()))?;

        if !workflow.is_active() {
            return Err(WorkflowError::WorkflowNotActive(workflow.id));
        }

        let revision = workflow.revision;
        let step = workflow
            .find_step_mut(&request.step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(request.step_id.clone()))?;
        let approval = step
            .as_approval_mut()
            .ok_or_else(|| WorkflowError::NotAnApprovalStep(request.step_id.clone()))?;

        let outcome = self.gate.decide(
            approval,
            user,
            request.decision,
            request.comment,
            request.expected_version,
        )?;

        self.store.update_workflow(workflow, revision).await?;
        info!(outcome = ?outcome, "Approval processed");
        Ok(outcome)
    }
}
