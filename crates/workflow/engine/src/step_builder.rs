//! Step builder: structural edits on a workflow's step sequence
//!
//! All edits are synchronous and in-memory. Steps nested inside condition
//! branches are addressed by ID exactly like top-level steps; an edit acts
//! on whichever sequence directly holds the step. Relative order of steps
//! not named by an edit never changes.

use crate::config::ApprovalSettings;
use tracing::{debug, info};
use workflow_types::{
    containing_vec_mut, count_steps, find_step, find_step_mut, Branch, RoleId, StepId, StepPatch,
    StepType, WorkflowError, WorkflowResult, WorkflowStep,
};

/// Direction for [`StepBuilder::move_step`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward index 0
    Up,
    /// Toward the end of the sequence
    Down,
}

/// Owns a step sequence and applies structural edits to it
#[derive(Clone, Debug)]
pub struct StepBuilder {
    steps: Vec<WorkflowStep>,
    /// Role placed on new approval steps
    approver_role: RoleId,
}

impl StepBuilder {
    /// Create an empty builder
    pub fn new(approver_role: RoleId) -> Self {
        Self::from_steps(Vec::new(), approver_role)
    }

    /// Create a builder over an existing sequence
    pub fn from_steps(steps: Vec<WorkflowStep>, approver_role: RoleId) -> Self {
        Self {
            steps,
            approver_role,
        }
    }

    /// Create an empty builder using the configured default approver role
    pub fn with_settings(settings: &ApprovalSettings) -> Self {
        Self::new(RoleId::new(settings.default_approver_role.clone()))
    }

    /// Add a step of the given type with default configuration.
    ///
    /// The step goes right after `after` when that step exists (in whatever
    /// branch holds it), otherwise at the end of the top-level sequence.
    pub fn add_step(&mut self, step_type: StepType, after: Option<&StepId>) -> StepId {
        let step = WorkflowStep::with_defaults(step_type, &self.approver_role);
        let id = step.id.clone();

        let slot = match after {
            Some(anchor) => containing_vec_mut(&mut self.steps, anchor),
            None => None,
        };
        match slot {
            Some((sequence, index)) => sequence.insert(index + 1, step),
            None => {
                if let Some(anchor) = after {
                    debug!(anchor = %anchor, "Anchor step not found, appending");
                }
                self.steps.push(step);
            }
        }

        info!(step_id = %id, step_type = %step_type, "Step added");
        id
    }

    /// Add a condition step; shorthand for `add_step(StepType::Condition, after)`
    pub fn add_condition(&mut self, after: Option<&StepId>) -> StepId {
        self.add_step(StepType::Condition, after)
    }

    /// Append a new default step to one branch of a condition step
    pub fn add_branch_step(
        &mut self,
        condition_id: &StepId,
        branch: Branch,
        step_type: StepType,
    ) -> WorkflowResult<StepId> {
        let step = WorkflowStep::with_defaults(step_type, &self.approver_role);
        let id = step.id.clone();

        let parent = find_step_mut(&mut self.steps, condition_id)
            .ok_or_else(|| WorkflowError::StepNotFound(condition_id.clone()))?;
        let condition = parent
            .as_condition_mut()
            .ok_or_else(|| WorkflowError::NotAConditionStep(condition_id.clone()))?;
        condition.branch_mut(branch).push(step);

        info!(
            step_id = %id,
            condition_id = %condition_id,
            branch = %branch,
            step_type = %step_type,
            "Branch step added"
        );
        Ok(id)
    }

    /// Shallow-merge a patch into the step with the given ID
    pub fn update_step(&mut self, id: &StepId, patch: StepPatch) -> WorkflowResult<()> {
        let step = find_step_mut(&mut self.steps, id)
            .ok_or_else(|| WorkflowError::StepNotFound(id.clone()))?;
        step.apply(patch)?;

        debug!(step_id = %id, "Step updated");
        Ok(())
    }

    /// Remove a step. A condition step takes its branches with it.
    pub fn remove_step(&mut self, id: &StepId) -> WorkflowResult<WorkflowStep> {
        let (sequence, index) = containing_vec_mut(&mut self.steps, id)
            .ok_or_else(|| WorkflowError::StepNotFound(id.clone()))?;
        let removed = sequence.remove(index);

        info!(
            step_id = %id,
            removed_total = count_steps(std::slice::from_ref(&removed)),
            "Step removed"
        );
        Ok(removed)
    }

    /// Swap a step with its neighbour.
    ///
    /// Returns `Ok(false)` without changing anything when the step is
    /// already first (moving up) or last (moving down).
    pub fn move_step(&mut self, id: &StepId, direction: MoveDirection) -> WorkflowResult<bool> {
        let (sequence, index) = containing_vec_mut(&mut self.steps, id)
            .ok_or_else(|| WorkflowError::StepNotFound(id.clone()))?;

        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => (index + 1 < sequence.len()).then_some(index + 1),
        };

        match target {
            Some(target) => {
                sequence.swap(index, target);
                debug!(step_id = %id, from = index, to = target, "Step moved");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Query methods ---

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn find_step(&self, id: &StepId) -> Option<&WorkflowStep> {
        find_step(&self.steps, id)
    }

    /// IDs of the top-level sequence, in order
    pub fn step_ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id.clone()).collect()
    }

    /// Number of top-level steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<WorkflowStep> {
        self.steps
    }
}

impl Default for StepBuilder {
    fn default() -> Self {
        Self::with_settings(&ApprovalSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::{
        ActionConfig, ApprovalPatch, BodyPatch, ConditionPatch, ConditionType, StepKind,
        TaskAction,
    };

    fn builder_with(types: &[StepType]) -> (StepBuilder, Vec<StepId>) {
        let mut builder = StepBuilder::default();
        let ids = types.iter().map(|t| builder.add_step(*t, None)).collect();
        (builder, ids)
    }

    #[test]
    fn test_trigger_then_action() {
        let mut builder = StepBuilder::default();
        let trigger = builder.add_step(StepType::Trigger, None);
        let action = builder.add_step(StepType::Action, Some(&trigger));

        assert_eq!(builder.step_ids(), vec![trigger, action]);
        assert_eq!(builder.steps()[0].step_type(), StepType::Trigger);
        assert_eq!(builder.steps()[1].step_type(), StepType::Action);
    }

    #[test]
    fn test_add_after_inserts_in_the_middle() {
        let (mut builder, ids) =
            builder_with(&[StepType::Trigger, StepType::Action, StepType::Action]);
        let approval = builder.add_step(StepType::Approval, Some(&ids[0]));
        assert_eq!(
            builder.step_ids(),
            vec![ids[0].clone(), approval, ids[1].clone(), ids[2].clone()]
        );
    }

    #[test]
    fn test_add_after_unknown_appends() {
        let (mut builder, ids) = builder_with(&[StepType::Trigger]);
        let action = builder.add_step(StepType::Action, Some(&StepId::new("missing")));
        assert_eq!(builder.step_ids(), vec![ids[0].clone(), action]);
    }

    #[test]
    fn test_add_approval_defaults() {
        let mut builder = StepBuilder::default();
        let id = builder.add_step(StepType::Approval, None);
        let approval = builder.find_step(&id).unwrap().as_approval().unwrap();
        assert_eq!(approval.required_approvals, 1);
        assert_eq!(approval.approver_roles.len(), 1);
        assert!(approval.approver_roles.contains(&RoleId::new("board_member")));
        assert!(approval.approvals.is_empty());
    }

    #[test]
    fn test_configured_approver_role() {
        let settings = ApprovalSettings {
            default_approver_role: "treasurer".into(),
            ..ApprovalSettings::default()
        };
        let mut builder = StepBuilder::with_settings(&settings);
        let id = builder.add_step(StepType::Approval, None);
        let approval = builder.find_step(&id).unwrap().as_approval().unwrap();
        assert!(approval.approver_roles.contains(&RoleId::new("treasurer")));
    }

    #[test]
    fn test_add_condition() {
        let (mut builder, ids) = builder_with(&[StepType::Trigger, StepType::Action]);
        let cond = builder.add_condition(Some(&ids[0]));
        assert_eq!(builder.steps()[1].id, cond);
        assert_eq!(builder.steps()[1].step_type(), StepType::Condition);
    }

    #[test]
    fn test_move_up_and_back() {
        let (mut builder, ids) =
            builder_with(&[StepType::Trigger, StepType::Action, StepType::Approval]);
        let (a, b, c) = (ids[0].clone(), ids[1].clone(), ids[2].clone());

        assert!(builder.move_step(&b, MoveDirection::Up).unwrap());
        assert_eq!(builder.step_ids(), vec![b.clone(), a.clone(), c.clone()]);

        assert!(builder.move_step(&a, MoveDirection::Up).unwrap());
        assert_eq!(builder.step_ids(), vec![a, b, c]);
    }

    #[test]
    fn test_move_at_boundaries_is_noop() {
        let (mut builder, ids) = builder_with(&[StepType::Trigger, StepType::Action]);
        assert!(!builder.move_step(&ids[0], MoveDirection::Up).unwrap());
        assert!(!builder.move_step(&ids[1], MoveDirection::Down).unwrap());
        assert_eq!(builder.step_ids(), ids);
    }

    #[test]
    fn test_move_unknown_step() {
        let (mut builder, _) = builder_with(&[StepType::Trigger]);
        let result = builder.move_step(&StepId::new("missing"), MoveDirection::Down);
        assert!(matches!(result, Err(WorkflowError::StepNotFound(_))));
    }

    #[test]
    fn test_remove_step_keeps_order() {
        let (mut builder, ids) =
            builder_with(&[StepType::Trigger, StepType::Action, StepType::Approval]);
        let removed = builder.remove_step(&ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        assert_eq!(builder.step_ids(), vec![ids[0].clone(), ids[2].clone()]);
    }

    #[test]
    fn test_remove_unknown_step() {
        let (mut builder, _) = builder_with(&[StepType::Trigger]);
        let result = builder.remove_step(&StepId::new("missing"));
        assert!(matches!(result, Err(WorkflowError::StepNotFound(_))));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_remove_condition_cascades() {
        let mut builder = StepBuilder::default();
        let cond = builder.add_condition(None);
        let yes = builder
            .add_branch_step(&cond, Branch::True, StepType::Action)
            .unwrap();
        let no = builder
            .add_branch_step(&cond, Branch::False, StepType::Approval)
            .unwrap();
        assert!(builder.find_step(&yes).is_some());

        let removed = builder.remove_step(&cond).unwrap();
        assert_eq!(count_steps(std::slice::from_ref(&removed)), 3);
        assert!(builder.is_empty());
        assert!(builder.find_step(&yes).is_none());
        assert!(builder.find_step(&no).is_none());
    }

    #[test]
    fn test_branch_edits() {
        let mut builder = StepBuilder::default();
        let cond = builder.add_condition(None);
        let first = builder
            .add_branch_step(&cond, Branch::True, StepType::Action)
            .unwrap();
        let second = builder
            .add_branch_step(&cond, Branch::True, StepType::Approval)
            .unwrap();
        let between = builder.add_step(StepType::Action, Some(&first));

        let branch = builder
            .find_step(&cond)
            .unwrap()
            .as_condition()
            .unwrap()
            .branch(Branch::True)
            .iter()
            .map(|s| s.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(branch, vec![first.clone(), between.clone(), second.clone()]);
        assert_eq!(builder.len(), 1);

        assert!(builder.move_step(&second, MoveDirection::Up).unwrap());
        assert!(!builder.move_step(&first, MoveDirection::Up).unwrap());
        let branch = builder
            .find_step(&cond)
            .unwrap()
            .as_condition()
            .unwrap()
            .branch(Branch::True)
            .iter()
            .map(|s| s.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(branch, vec![first, second, between]);
    }

    #[test]
    fn test_branch_on_non_condition() {
        let (mut builder, ids) = builder_with(&[StepType::Action]);
        let result = builder.add_branch_step(&ids[0], Branch::True, StepType::Action);
        assert!(matches!(result, Err(WorkflowError::NotAConditionStep(_))));

        let result =
            builder.add_branch_step(&StepId::new("missing"), Branch::True, StepType::Action);
        assert!(matches!(result, Err(WorkflowError::StepNotFound(_))));
    }

    #[test]
    fn test_update_step() {
        let (mut builder, ids) = builder_with(&[StepType::Action, StepType::Condition]);

        builder
            .update_step(
                &ids[0],
                StepPatch::body(BodyPatch::Action(ActionConfig::Task(TaskAction::new(
                    "Schedule inspection",
                ))))
                .with_name("Inspection"),
            )
            .unwrap();
        let step = builder.find_step(&ids[0]).unwrap();
        assert_eq!(step.name, "Inspection");
        assert!(matches!(&step.kind, StepKind::Action(ActionConfig::Task(_))));

        builder
            .update_step(
                &ids[1],
                StepPatch::body(BodyPatch::Condition(ConditionPatch {
                    condition_type: Some(ConditionType::IsTrue),
                    field: Some("hasViolation".into()),
                    value: None,
                })),
            )
            .unwrap();
        let cond = builder.find_step(&ids[1]).unwrap().as_condition().unwrap();
        assert_eq!(cond.condition_type, ConditionType::IsTrue);
        assert_eq!(cond.field, "hasViolation");
    }

    #[test]
    fn test_update_unknown_or_mismatched() {
        let (mut builder, ids) = builder_with(&[StepType::Action]);

        let result = builder.update_step(&StepId::new("missing"), StepPatch::rename("x"));
        assert!(matches!(result, Err(WorkflowError::StepNotFound(_))));

        let result = builder.update_step(
            &ids[0],
            StepPatch::body(BodyPatch::Approval(ApprovalPatch::default())),
        );
        assert!(matches!(
            result,
            Err(WorkflowError::StepTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_into_steps() {
        let (builder, ids) = builder_with(&[StepType::Trigger, StepType::Action]);
        let steps = builder.into_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].id, ids[0]);
    }
}
