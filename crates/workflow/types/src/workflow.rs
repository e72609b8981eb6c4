//! Workflows: a named, ordered sequence of steps
//!
//! A workflow is edited while in `Draft`, runs while `Active`, and is kept
//! for reference once `Archived`. Pending-approval discovery only looks at
//! active workflows.

use crate::{
    find_step, find_step_mut, walk_steps, StepId, StepKind, WorkflowError, WorkflowResult,
    WorkflowStep,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a workflow
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub String);

impl WorkflowId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Workflow ─────────────────────────────────────────────────────────

/// Lifecycle of a workflow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

/// A workflow and its step sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: WorkflowStatus,
    /// Execution order
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    /// Bumped by the store on every successful write
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::generate(),
            name: name.into(),
            description: String::new(),
            status: WorkflowStatus::Draft,
            steps: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = WorkflowId::new(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_steps(mut self, steps: Vec<WorkflowStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn activate(&mut self) {
        self.status = WorkflowStatus::Active;
        self.touch();
    }

    pub fn archive(&mut self) {
        self.status = WorkflowStatus::Archived;
        self.touch();
    }

    pub fn is_active(&self) -> bool {
        self.status == WorkflowStatus::Active
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn find_step(&self, id: &StepId) -> Option<&WorkflowStep> {
        find_step(&self.steps, id)
    }

    pub fn find_step_mut(&mut self, id: &StepId) -> Option<&mut WorkflowStep> {
        find_step_mut(&mut self.steps, id)
    }

    /// Every approval step, branches included, in depth-first order
    pub fn approval_steps(&self) -> Vec<&WorkflowStep> {
        let mut found = Vec::new();
        walk_steps(&self.steps, &mut |step| {
            if step.as_approval().is_some() {
                found.push(step);
            }
        });
        found
    }

    /// Validate the step tree for structural correctness
    pub fn validate(&self) -> WorkflowResult<()> {
        validate_steps(&self.steps)
    }
}

/// Validate a step tree: unique IDs and well-formed variant bodies
pub fn validate_steps(steps: &[WorkflowStep]) -> WorkflowResult<()> {
    let mut seen = HashSet::new();
    let mut problem = None;

    walk_steps(steps, &mut |step| {
        if problem.is_some() {
            return;
        }
        if !seen.insert(step.id.clone()) {
            problem = Some(WorkflowError::DuplicateStepId(step.id.clone()));
            return;
        }
        problem = check_step(step).err();
    });

    match problem {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn check_step(step: &WorkflowStep) -> WorkflowResult<()> {
    match &step.kind {
        StepKind::Trigger(crate::TriggerConfig::Time(schedule)) if !schedule.is_valid() => Err(
            WorkflowError::Validation(format!("Step {} has an invalid day of month", step.id)),
        ),
        StepKind::Trigger(_) | StepKind::Action(_) => Ok(()),
        StepKind::Condition(condition) => {
            if condition.condition_type == crate::ConditionType::Between
                && condition.between_bounds().is_none()
            {
                return Err(WorkflowError::Validation(format!(
                    "Step {} needs a finite 'low,high' range with low <= high, got '{}'",
                    step.id, condition.value
                )));
            }
            Ok(())
        }
        StepKind::Approval(approval) => {
            if approval.required_approvals == 0 {
                return Err(WorkflowError::InvalidRequiredApprovals(0));
            }
            if approval.approver_roles.is_empty() {
                return Err(WorkflowError::Validation(format!(
                    "Step {} has no approver roles",
                    step.id
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ActionConfig, ApprovalStep, ConditionStep, ConditionType, RoleId, TimeTriggerConfig,
        TriggerConfig,
    };

    fn approval(id: &str) -> WorkflowStep {
        WorkflowStep::approval("Approve", ApprovalStep::new(RoleId::new("board_member")))
            .with_id(id)
    }

    fn make_workflow() -> Workflow {
        let cond = ConditionStep::new(ConditionType::GreaterThan, "amount", "5000")
            .with_true_steps(vec![approval("big-approval")]);
        Workflow::new("Invoice Approval")
            .with_description("Route vendor invoices to the board")
            .with_steps(vec![
                WorkflowStep::trigger("Invoice received", TriggerConfig::default()).with_id("t"),
                WorkflowStep::condition("Large?", cond).with_id("c"),
                approval("manager-approval"),
                WorkflowStep::action("Pay", ActionConfig::default()).with_id("pay"),
            ])
    }

    #[test]
    fn test_new_workflow_is_draft() {
        let wf = Workflow::new("Collections");
        assert_eq!(wf.status, WorkflowStatus::Draft);
        assert!(!wf.is_active());
        assert!(wf.steps.is_empty());
        assert_eq!(wf.revision, 0);
    }

    #[test]
    fn test_activate_and_archive() {
        let mut wf = make_workflow();
        wf.activate();
        assert!(wf.is_active());
        wf.archive();
        assert_eq!(wf.status, WorkflowStatus::Archived);
    }

    #[test]
    fn test_validate_valid_workflow() {
        assert!(make_workflow().validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_nested_id() {
        let mut wf = make_workflow();
        wf.steps.push(approval("big-approval"));
        assert!(matches!(
            wf.validate(),
            Err(WorkflowError::DuplicateStepId(id)) if id == StepId::new("big-approval")
        ));
    }

    #[test]
    fn test_validate_zero_required_approvals() {
        let mut step = approval("a");
        step.as_approval_mut().unwrap().required_approvals = 0;
        let wf = Workflow::new("Bad").with_steps(vec![step]);
        assert!(matches!(
            wf.validate(),
            Err(WorkflowError::InvalidRequiredApprovals(0))
        ));
    }

    #[test]
    fn test_validate_between_operand() {
        let cond = ConditionStep::new(ConditionType::Between, "balance", "100");
        let wf = Workflow::new("Bad").with_steps(vec![WorkflowStep::condition("Range", cond)]);
        assert!(matches!(wf.validate(), Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_validate_inverted_between_range() {
        let cond = ConditionStep::new(ConditionType::Between, "balance", "500,100");
        let wf = Workflow::new("Bad").with_steps(vec![WorkflowStep::condition("Range", cond)]);
        assert!(matches!(wf.validate(), Err(WorkflowError::Validation(_))));

        let cond = ConditionStep::new(ConditionType::Between, "balance", "100,500");
        let wf = Workflow::new("Good").with_steps(vec![WorkflowStep::condition("Range", cond)]);
        assert!(wf.validate().is_ok());
    }

    #[test]
    fn test_validate_day_of_month() {
        let wf = Workflow::new("Bad").with_steps(vec![WorkflowStep::trigger(
            "Monthly",
            TriggerConfig::Time(TimeTriggerConfig::monthly(40)),
        )]);
        assert!(matches!(wf.validate(), Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_approval_steps_include_branches() {
        let wf = make_workflow();
        let ids: Vec<_> = wf.approval_steps().iter().map(|s| s.id.0.clone()).collect();
        assert_eq!(ids, vec!["big-approval", "manager-approval"]);
    }

    #[test]
    fn test_workflow_round_trip() {
        let wf = make_workflow();
        let json = serde_json::to_string(&wf).unwrap();
        let back: Workflow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wf);
    }
}
