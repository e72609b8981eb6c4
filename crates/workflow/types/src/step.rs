//! Workflow steps: the tagged union every sequence is made of
//!
//! Steps serialize with a `type` discriminator next to their common
//! fields, e.g. `{"id": "...", "name": "...", "type": "approval", ...}`.
//! Condition steps nest further sequences, so lookups in this module walk
//! the whole tree.

use crate::{
    ActionConfig, ApprovalPatch, ApprovalStep, ConditionPatch, ConditionStep, RoleId,
    TriggerConfig, WorkflowError, WorkflowResult,
};
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique, immutable identifier of a step within a workflow
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub String);

impl StepId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Step ─────────────────────────────────────────────────────────────

/// The variant tag of a step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Trigger,
    Action,
    Condition,
    Approval,
}

impl StepType {
    /// Label given to freshly added steps
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Trigger => "New Trigger",
            Self::Action => "New Action",
            Self::Condition => "New Condition",
            Self::Approval => "New Approval",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Action => write!(f, "action"),
            Self::Condition => write!(f, "condition"),
            Self::Approval => write!(f, "approval"),
        }
    }
}

/// Variant-specific body of a step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepKind {
    Trigger(TriggerConfig),
    Action(ActionConfig),
    Condition(ConditionStep),
    Approval(ApprovalStep),
}

impl StepKind {
    /// Default body for a step type: first sub-type, default configuration
    pub fn default_for(step_type: StepType, approver_role: &RoleId) -> Self {
        match step_type {
            StepType::Trigger => Self::Trigger(TriggerConfig::default()),
            StepType::Action => Self::Action(ActionConfig::default()),
            StepType::Condition => Self::Condition(ConditionStep::default()),
            StepType::Approval => Self::Approval(ApprovalStep::new(approver_role.clone())),
        }
    }

    pub fn step_type(&self) -> StepType {
        match self {
            Self::Trigger(_) => StepType::Trigger,
            Self::Action(_) => StepType::Action,
            Self::Condition(_) => StepType::Condition,
            Self::Approval(_) => StepType::Approval,
        }
    }
}

/// One unit of a workflow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub name: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl WorkflowStep {
    /// Create a step with a freshly generated ID
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: StepId::generate(),
            name: name.into(),
            kind,
        }
    }

    /// Create a step of the given type with its default body and label
    pub fn with_defaults(step_type: StepType, approver_role: &RoleId) -> Self {
        Self::new(
            step_type.default_name(),
            StepKind::default_for(step_type, approver_role),
        )
    }

    pub fn trigger(name: impl Into<String>, config: TriggerConfig) -> Self {
        Self::new(name, StepKind::Trigger(config))
    }

    pub fn action(name: impl Into<String>, config: ActionConfig) -> Self {
        Self::new(name, StepKind::Action(config))
    }

    pub fn condition(name: impl Into<String>, condition: ConditionStep) -> Self {
        Self::new(name, StepKind::Condition(condition))
    }

    pub fn approval(name: impl Into<String>, approval: ApprovalStep) -> Self {
        Self::new(name, StepKind::Approval(approval))
    }

    /// Replace the generated ID; used for fixtures and imports
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = StepId::new(id);
        self
    }

    pub fn step_type(&self) -> StepType {
        self.kind.step_type()
    }

    pub fn as_approval(&self) -> Option<&ApprovalStep> {
        match &self.kind {
            StepKind::Approval(approval) => Some(approval),
            _ => None,
        }
    }

    pub fn as_approval_mut(&mut self) -> Option<&mut ApprovalStep> {
        match &mut self.kind {
            StepKind::Approval(approval) => Some(approval),
            _ => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionStep> {
        match &self.kind {
            StepKind::Condition(condition) => Some(condition),
            _ => None,
        }
    }

    pub fn as_condition_mut(&mut self) -> Option<&mut ConditionStep> {
        match &mut self.kind {
            StepKind::Condition(condition) => Some(condition),
            _ => None,
        }
    }

    /// Shallow-merge a patch into this step.
    ///
    /// The patch is checked in full before anything is written, so a failed
    /// patch leaves the step untouched.
    pub fn apply(&mut self, patch: StepPatch) -> WorkflowResult<()> {
        if let Some(body) = &patch.body {
            let expected = body.step_type();
            let actual = self.step_type();
            if expected != actual {
                return Err(WorkflowError::StepTypeMismatch {
                    id: self.id.clone(),
                    expected,
                    actual,
                });
            }
            if let BodyPatch::Approval(approval) = body {
                approval.check()?;
            }
        }

        if let Some(name) = patch.name {
            self.name = name;
        }

        match (patch.body, &mut self.kind) {
            (None, _) => {}
            (Some(BodyPatch::Trigger(config)), StepKind::Trigger(current)) => *current = config,
            (Some(BodyPatch::Action(config)), StepKind::Action(current)) => *current = config,
            (Some(BodyPatch::Condition(rule)), StepKind::Condition(current)) => rule.apply(current),
            (Some(BodyPatch::Approval(settings)), StepKind::Approval(current)) => {
                settings.apply(current)?
            }
            // Ruled out by the type check above
            (Some(_), _) => {}
        }
        Ok(())
    }
}

// ── Patches ──────────────────────────────────────────────────────────

/// Partial update of a step. `None` fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepPatch {
    pub name: Option<String>,
    pub body: Option<BodyPatch>,
}

impl StepPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            body: None,
        }
    }

    pub fn body(body: BodyPatch) -> Self {
        Self {
            name: None,
            body: Some(body),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Variant-specific part of a patch.
///
/// Trigger and action configs are replaced whole: callers send the full
/// desired configuration, including its sub-type.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyPatch {
    Trigger(TriggerConfig),
    Action(ActionConfig),
    Condition(ConditionPatch),
    Approval(ApprovalPatch),
}

impl BodyPatch {
    pub fn step_type(&self) -> StepType {
        match self {
            Self::Trigger(_) => StepType::Trigger,
            Self::Action(_) => StepType::Action,
            Self::Condition(_) => StepType::Condition,
            Self::Approval(_) => StepType::Approval,
        }
    }
}

// ── Tree navigation ──────────────────────────────────────────────────

/// Find a step anywhere in a sequence, including condition branches
pub fn find_step<'a>(steps: &'a [WorkflowStep], id: &StepId) -> Option<&'a WorkflowStep> {
    for step in steps {
        if &step.id == id {
            return Some(step);
        }
        if let StepKind::Condition(condition) = &step.kind {
            if let Some(found) = find_step(&condition.config.true_steps, id) {
                return Some(found);
            }
            if let Some(found) = find_step(&condition.config.false_steps, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Mutable counterpart of [`find_step`]
pub fn find_step_mut<'a>(
    steps: &'a mut [WorkflowStep],
    id: &StepId,
) -> Option<&'a mut WorkflowStep> {
    let (sequence, index) = containing_sequence_mut(steps, id)?;
    sequence.get_mut(index)
}

/// Locate the sequence that directly holds `id`, and the step's index in it
pub fn containing_sequence_mut<'a>(
    steps: &'a mut [WorkflowStep],
    id: &StepId,
) -> Option<(&'a mut [WorkflowStep], usize)> {
    if let Some(index) = steps.iter().position(|s| &s.id == id) {
        return Some((steps, index));
    }
    for step in steps.iter_mut() {
        if let StepKind::Condition(condition) = &mut step.kind {
            if let Some(found) = containing_sequence_mut(&mut condition.config.true_steps, id) {
                return Some(found);
            }
            if let Some(found) = containing_sequence_mut(&mut condition.config.false_steps, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Locate the growable vector that directly holds `id`, and the step's index
pub fn containing_vec_mut<'a>(
    steps: &'a mut Vec<WorkflowStep>,
    id: &StepId,
) -> Option<(&'a mut Vec<WorkflowStep>, usize)> {
    if let Some(index) = steps.iter().position(|s| &s.id == id) {
        return Some((steps, index));
    }
    for step in steps.iter_mut() {
        if let StepKind::Condition(condition) = &mut step.kind {
            if let Some(found) = containing_vec_mut(&mut condition.config.true_steps, id) {
                return Some(found);
            }
            if let Some(found) = containing_vec_mut(&mut condition.config.false_steps, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Depth-first walk over every step, branches included
pub fn walk_steps<'a>(steps: &'a [WorkflowStep], visit: &mut dyn FnMut(&'a WorkflowStep)) {
    for step in steps {
        visit(step);
        if let StepKind::Condition(condition) = &step.kind {
            walk_steps(&condition.config.true_steps, visit);
            walk_steps(&condition.config.false_steps, visit);
        }
    }
}

/// Number of steps in the tree, branches included
pub fn count_steps(steps: &[WorkflowStep]) -> usize {
    let mut count = 0;
    walk_steps(steps, &mut |_| count += 1);
    count
}
