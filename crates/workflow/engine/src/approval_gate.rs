//! Approval gate: who may decide on an approval step, and recording decisions
//!
//! Authorization runs before any mutation. A decision that passes the
//! check is appended only when the caller's view of the step is current,
//! as witnessed by the step's version counter.

use crate::config::ApprovalSettings;
use crate::permissions::PermissionService;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workflow_types::{Approval, ApprovalStep, Decision, User, WorkflowError, WorkflowResult};

/// Why a user was allowed to decide
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    /// The user's role is listed on the step
    Role,
    /// The permission service granted the approve action
    Permission,
}

/// Why a user was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    NotAuthenticated,
    AlreadyDecided,
    NotPermitted,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::NotAuthenticated => write!(f, "no authenticated user"),
            Denial::AlreadyDecided => write!(f, "user has already decided on this step"),
            Denial::NotPermitted => write!(f, "user may not approve this step"),
        }
    }
}

/// Result of the authorization check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    Allowed(Grant),
    Denied(Denial),
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed(_))
    }
}

/// How a pending approval step concerns a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproverRelation {
    /// May still decide
    Approver,
    /// Has decided; waiting on others
    Observer,
}

/// Effect of a recorded decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Approval recorded; `approved` of `required` so far
    Recorded { approved: usize, required: u32 },
    /// This approval brought the step to quorum
    ThresholdMet,
    /// Rejection recorded
    Rejected,
}

/// Authorizes and records approval decisions
#[derive(Clone)]
pub struct ApprovalGate {
    permissions: Arc<dyn PermissionService>,
    resource: String,
    action: String,
}

impl fmt::Debug for ApprovalGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalGate")
            .field("resource", &self.resource)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl ApprovalGate {
    pub fn new(permissions: Arc<dyn PermissionService>, settings: &ApprovalSettings) -> Self {
        Self {
            permissions,
            resource: settings.permission_resource.clone(),
            action: settings.permission_action.clone(),
        }
    }

    /// Run the authorization check for `user` on `step`
    pub fn authorize(&self, step: &ApprovalStep, user: Option<&User>) -> Authorization {
        let Some(user) = user else {
            return Authorization::Denied(Denial::NotAuthenticated);
        };
        if step.has_decided(&user.id) {
            return Authorization::Denied(Denial::AlreadyDecided);
        }
        if step.allows_role(&user.role) {
            return Authorization::Allowed(Grant::Role);
        }
        if self
            .permissions
            .has_permission(user, &self.resource, &self.action)
        {
            return Authorization::Allowed(Grant::Permission);
        }
        Authorization::Denied(Denial::NotPermitted)
    }

    pub fn can_approve(&self, step: &ApprovalStep, user: Option<&User>) -> bool {
        self.authorize(step, user).is_allowed()
    }

    /// How a pending step concerns `user`, if at all
    pub fn relation(&self, step: &ApprovalStep, user: &User) -> Option<ApproverRelation> {
        if step.has_decided(&user.id) {
            Some(ApproverRelation::Observer)
        } else if self.can_approve(step, Some(user)) {
            Some(ApproverRelation::Approver)
        } else {
            None
        }
    }

    /// Record a decision.
    ///
    /// Fails with `Unauthorized` when the check refuses the user, and with
    /// `VersionConflict` when `expected_version` is stale. Neither failure
    /// touches the step.
    pub fn decide(
        &self,
        step: &mut ApprovalStep,
        user: Option<&User>,
        decision: Decision,
        comment: Option<String>,
        expected_version: u64,
    ) -> WorkflowResult<DecisionOutcome> {
        let (grant, user) = match user {
            Some(user) => match self.authorize(step, Some(user)) {
                Authorization::Allowed(grant) => (grant, user),
                Authorization::Denied(denial) => return Err(refuse(&user.id.0, denial)),
            },
            None => return Err(refuse("<anonymous>", Denial::NotAuthenticated)),
        };

        if step.version != expected_version {
            debug!(
                expected = expected_version,
                actual = step.version,
                "Stale approval version"
            );
            return Err(WorkflowError::VersionConflict {
                expected: expected_version,
                actual: step.version,
            });
        }

        let was_satisfied = step.is_satisfied();
        let version = step.push_approval(Approval::new(user, decision, comment));

        let outcome = match decision {
            Decision::Reject => DecisionOutcome::Rejected,
            Decision::Approve if !was_satisfied && step.is_satisfied() => {
                DecisionOutcome::ThresholdMet
            }
            Decision::Approve => DecisionOutcome::Recorded {
                approved: step.approved_count(),
                required: step.required_approvals,
            },
        };

        info!(
            user_id = %user.id,
            decision = ?decision,
            grant = ?grant,
            approved = step.approved_count(),
            required = step.required_approvals,
            version,
            "Approval decision recorded"
        );
        Ok(outcome)
    }
}

fn refuse(user_id: &str, denial: Denial) -> WorkflowError {
    warn!(user_id, reason = %denial, "Approval decision refused");
    WorkflowError::Unauthorized(denial.to_string())
}
