//! Approval gates: quorum-based human sign-off
//!
//! An approval step holds the workflow until `required_approvals` distinct
//! authorized people have approved. Decisions are append-only; each person
//! decides at most once per step. The `version` counter advances with every
//! recorded decision so concurrent deciders can detect a stale view.

use crate::{RoleId, User, UserId, WorkflowError, WorkflowResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What kind of item is being approved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalType {
    #[default]
    Invoice,
    /// Architectural review committee request
    Arc,
    Violation,
    Collection,
    Other,
}

/// Status of one recorded decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Rejected,
}

/// The action a decider takes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// One person's recorded decision on an approval step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub approver_id: UserId,
    pub approver_name: String,
    pub approver_role: RoleId,
    pub status: ApprovalStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Approval {
    pub fn new(user: &User, decision: Decision, comment: Option<String>) -> Self {
        Self {
            approver_id: user.id.clone(),
            approver_name: user.name.clone(),
            approver_role: user.role.clone(),
            status: decision.status(),
            timestamp: Utc::now(),
            comment,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}

/// Gate state derived from the recorded decisions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    /// Fewer approvals than required
    Pending,
    /// Quorum reached; further approvals are still recorded
    Satisfied,
}

/// Per-step extras of an approval gate
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStepConfig {
    /// Advisory only; nothing transitions when it passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// An approval step body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    pub approval_type: ApprovalType,
    pub required_approvals: u32,
    pub approver_roles: BTreeSet<RoleId>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    /// Number of decisions recorded so far; advances on every append
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub config: ApprovalStepConfig,
}

impl ApprovalStep {
    /// A single-approval gate open to one role
    pub fn new(approver_role: RoleId) -> Self {
        Self {
            approval_type: ApprovalType::default(),
            required_approvals: 1,
            approver_roles: BTreeSet::from([approver_role]),
            approvals: Vec::new(),
            version: 0,
            config: ApprovalStepConfig::default(),
        }
    }

    pub fn with_type(mut self, approval_type: ApprovalType) -> Self {
        self.approval_type = approval_type;
        self
    }

    pub fn with_required_approvals(mut self, required: u32) -> WorkflowResult<Self> {
        if required == 0 {
            return Err(WorkflowError::InvalidRequiredApprovals(required));
        }
        self.required_approvals = required;
        Ok(self)
    }

    pub fn with_approver_role(mut self, role: RoleId) -> Self {
        self.approver_roles.insert(role);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.config.due_date = Some(due);
        self
    }

    pub fn approved_count(&self) -> usize {
        self.approvals.iter().filter(|a| a.is_approved()).count()
    }

    pub fn rejected_count(&self) -> usize {
        self.approvals.len() - self.approved_count()
    }

    /// Approvals still needed to reach quorum
    pub fn remaining(&self) -> usize {
        (self.required_approvals as usize).saturating_sub(self.approved_count())
    }

    pub fn state(&self) -> ApprovalState {
        if self.approved_count() >= self.required_approvals as usize {
            ApprovalState::Satisfied
        } else {
            ApprovalState::Pending
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.state() == ApprovalState::Satisfied
    }

    pub fn has_decided(&self, user_id: &UserId) -> bool {
        self.approvals.iter().any(|a| &a.approver_id == user_id)
    }

    pub fn decision_of(&self, user_id: &UserId) -> Option<&Approval> {
        self.approvals.iter().find(|a| &a.approver_id == user_id)
    }

    pub fn allows_role(&self, role: &RoleId) -> bool {
        self.approver_roles.contains(role)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_satisfied() && self.config.due_date.is_some_and(|due| now > due)
    }

    /// Append a decision and advance the version.
    ///
    /// Does not check authorization; callers go through the approval gate.
    pub fn push_approval(&mut self, approval: Approval) -> u64 {
        self.approvals.push(approval);
        self.version += 1;
        self.version
    }
}

/// Partial update of an approval step's settings.
///
/// Recorded decisions and the version counter are never patched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApprovalPatch {
    pub approval_type: Option<ApprovalType>,
    pub required_approvals: Option<u32>,
    pub approver_roles: Option<BTreeSet<RoleId>>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl ApprovalPatch {
    /// Reject values that would break the step before anything is written
    pub fn check(&self) -> WorkflowResult<()> {
        if let Some(0) = self.required_approvals {
            return Err(WorkflowError::InvalidRequiredApprovals(0));
        }
        if let Some(roles) = &self.approver_roles {
            if roles.is_empty() {
                return Err(WorkflowError::Validation(
                    "Approval step needs at least one approver role".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn apply(self, step: &mut ApprovalStep) -> WorkflowResult<()> {
        self.check()?;
        if let Some(approval_type) = self.approval_type {
            step.approval_type = approval_type;
        }
        if let Some(required) = self.required_approvals {
            step.required_approvals = required;
        }
        if let Some(roles) = self.approver_roles {
            step.approver_roles = roles;
        }
        if let Some(due_date) = self.due_date {
            step.config.due_date = due_date;
        }
        Ok(())
    }
}
