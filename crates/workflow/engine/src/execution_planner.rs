//! Execution planner: walks a step tree in order against a data record
//!
//! Condition steps descend into the branch the evaluator picks; approval
//! steps that have not met quorum halt the walk. Nothing is executed here,
//! the plan only reports which steps would run.

use crate::condition_evaluator::ConditionEvaluator;
use serde_json::Value;
use tracing::debug;
use workflow_types::{Branch, StepId, StepKind, WorkflowStep};

/// The steps a record would pass through
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Steps reached, in execution order
    pub path: Vec<StepId>,
    /// Branch chosen at each condition step
    pub branches_taken: Vec<(StepId, Branch)>,
    /// The pending approval step the walk stopped at
    pub blocked_on: Option<StepId>,
}

impl ExecutionPlan {
    /// True when no approval step blocked the walk
    pub fn is_complete(&self) -> bool {
        self.blocked_on.is_none()
    }
}

/// Plans step execution
#[derive(Clone, Debug, Default)]
pub struct ExecutionPlanner {
    evaluator: ConditionEvaluator,
}

enum Walk {
    Continue,
    Blocked,
}

impl ExecutionPlanner {
    pub fn new(evaluator: ConditionEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn plan(&self, steps: &[WorkflowStep], record: &Value) -> ExecutionPlan {
        let mut plan = ExecutionPlan::default();
        self.walk(steps, record, &mut plan);
        debug!(
            reached = plan.path.len(),
            blocked = !plan.is_complete(),
            "Execution planned"
        );
        plan
    }

    fn walk(&self, steps: &[WorkflowStep], record: &Value, plan: &mut ExecutionPlan) -> Walk {
        for step in steps {
            match &step.kind {
                StepKind::Approval(approval) if !approval.is_satisfied() => {
                    plan.blocked_on = Some(step.id.clone());
                    return Walk::Blocked;
                }
                StepKind::Condition(condition) => {
                    plan.path.push(step.id.clone());
                    let branch = self.evaluator.select_branch(condition, record);
                    plan.branches_taken.push((step.id.clone(), branch));
                    if let Walk::Blocked = self.walk(condition.branch(branch), record, plan) {
                        return Walk::Blocked;
                    }
                }
                _ => plan.path.push(step.id.clone()),
            }
        }
        Walk::Continue
    }
}
