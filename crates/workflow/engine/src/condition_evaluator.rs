//! Condition evaluator: decides which branch of a condition step runs
//!
//! Evaluation is pure. The data record is a JSON object supplied by the
//! collaborator that owns it (an invoice, a violation, an owner account).
//! Fields are looked up by name; dotted names walk into nested objects.

use serde_json::Value;
use tracing::debug;
use workflow_types::{Branch, ConditionStep, ConditionType};

/// Evaluates condition steps against data records
#[derive(Clone, Debug, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Pick the branch a record sends the condition down
    pub fn select_branch(&self, condition: &ConditionStep, record: &Value) -> Branch {
        Branch::from(self.evaluate(condition, record))
    }

    /// Evaluate the comparison.
    ///
    /// A missing (or `null`) field makes every comparison false except
    /// `notEquals`, which is true.
    pub fn evaluate(&self, condition: &ConditionStep, record: &Value) -> bool {
        let field = lookup(record, &condition.field);
        let operand = condition.value.as_str();

        let result = match (condition.condition_type, field) {
            (ConditionType::NotEquals, None) => true,
            (_, None) => false,
            (ConditionType::Equals, Some(actual)) => values_equal(actual, operand),
            (ConditionType::NotEquals, Some(actual)) => !values_equal(actual, operand),
            (ConditionType::Contains, Some(actual)) => contains(actual, operand),
            (ConditionType::GreaterThan, Some(actual)) => {
                compare_numbers(actual, operand, |a, b| a > b)
            }
            (ConditionType::LessThan, Some(actual)) => {
                compare_numbers(actual, operand, |a, b| a < b)
            }
            (ConditionType::Between, Some(actual)) => {
                match (as_number(actual), condition.between_bounds()) {
                    (Some(n), Some((low, high))) => low <= n && n <= high,
                    _ => false,
                }
            }
            (ConditionType::IsTrue, Some(actual)) => as_bool(actual) == Some(true),
            (ConditionType::IsFalse, Some(actual)) => as_bool(actual) == Some(false),
        };

        debug!(
            field = %condition.field,
            condition_type = ?condition.condition_type,
            operand = operand,
            result,
            "Condition evaluated"
        );
        result
    }
}

/// Resolve a possibly dotted field name; `null` counts as missing
fn lookup<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(field) {
        return non_null(value);
    }
    let mut current = record;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    non_null(current)
}

fn non_null(value: &Value) -> Option<&Value> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Textual form used for string comparisons
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Text equality; numbers and booleans compare by their JSON rendering
fn values_equal(actual: &Value, operand: &str) -> bool {
    as_text(actual) == operand
}

fn contains(actual: &Value, operand: &str) -> bool {
    match actual {
        Value::String(s) => s.contains(operand),
        Value::Array(items) => items.iter().any(|item| values_equal(item, operand)),
        _ => false,
    }
}

fn compare_numbers(actual: &Value, operand: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), operand.trim().parse::<f64>()) {
        (Some(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(condition_type: ConditionType, field: &str, value: &str) -> ConditionStep {
        ConditionStep::new(condition_type, field, value)
    }

    #[test]
    fn test_equals_selects_branch() {
        let evaluator = ConditionEvaluator::new();
        let paid = cond(ConditionType::Equals, "paymentStatus", "paid");

        assert_eq!(
            evaluator.select_branch(&paid, &json!({"paymentStatus": "paid"})),
            Branch::True
        );
        assert_eq!(
            evaluator.select_branch(&paid, &json!({"paymentStatus": "due"})),
            Branch::False
        );
    }

    #[test]
    fn test_equals_numeric_text() {
        let evaluator = ConditionEvaluator::new();
        let c = cond(ConditionType::Equals, "units", "12");
        assert!(evaluator.evaluate(&c, &json!({"units": 12})));
        assert!(evaluator.evaluate(&c, &json!({"units": "12"})));
        assert!(!evaluator.evaluate(&c, &json!({"units": 13})));
    }

    #[test]
    fn test_equality_is_textual() {
        let evaluator = ConditionEvaluator::new();
        let unit = cond(ConditionType::Equals, "unit", "1234");
        assert!(!evaluator.evaluate(&unit, &json!({"unit": "01234"})));
        assert!(evaluator.evaluate(&unit, &json!({"unit": "1234"})));

        let not_unit = cond(ConditionType::NotEquals, "unit", "1234");
        assert!(evaluator.evaluate(&not_unit, &json!({"unit": "01234"})));

        let thousand = cond(ConditionType::NotEquals, "amount", "1000");
        assert!(evaluator.evaluate(&thousand, &json!({"amount": "1e3"})));

        let tags = cond(ConditionType::Contains, "units", "1234");
        assert!(!evaluator.evaluate(&tags, &json!({"units": ["01234", "0042"]})));
        assert!(evaluator.evaluate(&tags, &json!({"units": ["0042", 1234]})));
    }

    #[test]
    fn test_not_equals_and_missing_field() {
        let evaluator = ConditionEvaluator::new();
        let c = cond(ConditionType::NotEquals, "status", "closed");
        assert!(evaluator.evaluate(&c, &json!({"status": "open"})));
        assert!(!evaluator.evaluate(&c, &json!({"status": "closed"})));
        assert!(evaluator.evaluate(&c, &json!({})));
        assert!(evaluator.evaluate(&c, &json!({"status": null})));

        let eq = cond(ConditionType::Equals, "status", "closed");
        assert!(!evaluator.evaluate(&eq, &json!({})));
    }

    #[test]
    fn test_contains() {
        let evaluator = ConditionEvaluator::new();
        let c = cond(ConditionType::Contains, "notes", "fence");
        assert!(evaluator.evaluate(&c, &json!({"notes": "new fence request"})));
        assert!(!evaluator.evaluate(&c, &json!({"notes": "pool"})));

        let tags = cond(ConditionType::Contains, "tags", "pool");
        assert!(evaluator.evaluate(&tags, &json!({"tags": ["gate", "pool"]})));
        assert!(!evaluator.evaluate(&tags, &json!({"tags": ["gate"]})));
        assert!(!evaluator.evaluate(&tags, &json!({"tags": 5})));
    }

    #[test]
    fn test_numeric_comparisons() {
        let evaluator = ConditionEvaluator::new();
        let gt = cond(ConditionType::GreaterThan, "amount", "5000");
        assert!(evaluator.evaluate(&gt, &json!({"amount": 7500.25})));
        assert!(evaluator.evaluate(&gt, &json!({"amount": "6000"})));
        assert!(!evaluator.evaluate(&gt, &json!({"amount": 5000})));
        assert!(!evaluator.evaluate(&gt, &json!({"amount": "lots"})));

        let lt = cond(ConditionType::LessThan, "daysOverdue", "30");
        assert!(evaluator.evaluate(&lt, &json!({"daysOverdue": 10})));
        assert!(!evaluator.evaluate(&lt, &json!({"daysOverdue": 30})));

        let bad_operand = cond(ConditionType::GreaterThan, "amount", "n/a");
        assert!(!evaluator.evaluate(&bad_operand, &json!({"amount": 1})));
    }

    #[test]
    fn test_between_is_inclusive() {
        let evaluator = ConditionEvaluator::new();
        let c = cond(ConditionType::Between, "balance", "100,500");
        assert!(evaluator.evaluate(&c, &json!({"balance": 100})));
        assert!(evaluator.evaluate(&c, &json!({"balance": 500})));
        assert!(evaluator.evaluate(&c, &json!({"balance": 250.5})));
        assert!(!evaluator.evaluate(&c, &json!({"balance": 501})));

        let malformed = cond(ConditionType::Between, "balance", "100");
        assert!(!evaluator.evaluate(&malformed, &json!({"balance": 100})));
    }

    #[test]
    fn test_boolean_checks() {
        let evaluator = ConditionEvaluator::new();
        let is_true = cond(ConditionType::IsTrue, "hasViolation", "");
        let is_false = cond(ConditionType::IsFalse, "hasViolation", "");

        assert!(evaluator.evaluate(&is_true, &json!({"hasViolation": true})));
        assert!(evaluator.evaluate(&is_true, &json!({"hasViolation": "TRUE"})));
        assert!(!evaluator.evaluate(&is_true, &json!({"hasViolation": false})));
        assert!(evaluator.evaluate(&is_false, &json!({"hasViolation": false})));
        assert!(!evaluator.evaluate(&is_false, &json!({})));
        assert!(!evaluator.evaluate(&is_false, &json!({"hasViolation": 0})));
    }

    #[test]
    fn test_dotted_field_lookup() {
        let evaluator = ConditionEvaluator::new();
        let c = cond(ConditionType::Equals, "owner.status", "delinquent");
        assert!(evaluator.evaluate(&c, &json!({"owner": {"status": "delinquent"}})));
        assert!(!evaluator.evaluate(&c, &json!({"owner": {}})));

        let literal = json!({"owner.status": "delinquent"});
        assert!(evaluator.evaluate(&c, &literal));
    }
}
