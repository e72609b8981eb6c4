//! Conditions: branch a workflow on a field of the data record
//!
//! A condition step owns two nested step sequences. Exactly one of them
//! runs, depending on how the comparison evaluates. The branches are owned
//! by the condition step, so removing the step removes them too.

use crate::WorkflowStep;
use serde::{Deserialize, Serialize};

/// Comparison applied to the record field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionType {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    /// Inclusive range; `value` is written `low,high`
    Between,
    IsTrue,
    IsFalse,
}

impl ConditionType {
    /// Whether the comparison reads the `value` operand
    pub fn uses_operand(&self) -> bool {
        !matches!(self, Self::IsTrue | Self::IsFalse)
    }
}

/// Which branch of a condition step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    True,
    False,
}

impl From<bool> for Branch {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
        }
    }
}

/// The nested sequences of a condition step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionBranches {
    #[serde(default)]
    pub true_steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub false_steps: Vec<WorkflowStep>,
}

/// A condition step body
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionStep {
    pub condition_type: ConditionType,
    /// Name of the record field being tested; dotted paths reach nested objects
    #[serde(default)]
    pub field: String,
    /// Comparison operand, always carried as text
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub config: ConditionBranches,
}

impl ConditionStep {
    pub fn new(
        condition_type: ConditionType,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            condition_type,
            field: field.into(),
            value: value.into(),
            config: ConditionBranches::default(),
        }
    }

    pub fn with_true_steps(mut self, steps: Vec<WorkflowStep>) -> Self {
        self.config.true_steps = steps;
        self
    }

    pub fn with_false_steps(mut self, steps: Vec<WorkflowStep>) -> Self {
        self.config.false_steps = steps;
        self
    }

    pub fn branch(&self, branch: Branch) -> &[WorkflowStep] {
        match branch {
            Branch::True => &self.config.true_steps,
            Branch::False => &self.config.false_steps,
        }
    }

    pub fn branch_mut(&mut self, branch: Branch) -> &mut Vec<WorkflowStep> {
        match branch {
            Branch::True => &mut self.config.true_steps,
            Branch::False => &mut self.config.false_steps,
        }
    }

    /// Parse the `low,high` operand of a `between` condition.
    ///
    /// `None` unless both bounds are finite and `low <= high`.
    pub fn between_bounds(&self) -> Option<(f64, f64)> {
        let (low, high) = self.value.split_once(',')?;
        let low = low.trim().parse::<f64>().ok()?;
        let high = high.trim().parse::<f64>().ok()?;
        (low.is_finite() && high.is_finite() && low <= high).then_some((low, high))
    }
}

/// Partial update of a condition step's rule; branches are edited through
/// the builder, never replaced wholesale
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionPatch {
    pub condition_type: Option<ConditionType>,
    pub field: Option<String>,
    pub value: Option<String>,
}

impl ConditionPatch {
    pub fn apply(self, step: &mut ConditionStep) {
        if let Some(condition_type) = self.condition_type {
            step.condition_type = condition_type;
        }
        if let Some(field) = self.field {
            step.field = field;
        }
        if let Some(value) = self.value {
            step.value = value;
        }
    }
}
