//! Error types for the workflow layer

use crate::{StepId, StepType, WorkflowId};

/// Errors that can occur in workflow operations
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("Workflow is not active: {0}")]
    WorkflowNotActive(WorkflowId),

    #[error("Step not found: {0}")]
    StepNotFound(StepId),

    #[error("Step {0} is not an approval step")]
    NotAnApprovalStep(StepId),

    #[error("Step {0} is not a condition step")]
    NotAConditionStep(StepId),

    #[error("Step {id} is a {actual} step, patch targets {expected}")]
    StepTypeMismatch {
        id: StepId,
        expected: StepType,
        actual: StepType,
    },

    #[error("Duplicate step ID: {0}")]
    DuplicateStepId(StepId),

    #[error("Required approvals must be at least 1, got {0}")]
    InvalidRequiredApprovals(u32),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Approval version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Workflow validation error: {0}")]
    Validation(String),
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
