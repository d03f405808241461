//! `eq`, `neq`, `gt`, `gte`, `lt`, `lte`.

use arbiter_types::Value;

use super::{OperatorHandler, Scope};
use crate::coerce::to_time;
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Equality is structural. Ordering compares instants when both sides read
/// as times, otherwise requires both sides to share a kind.
///
/// `gte`, `lt` and `lte` are derived from `gt` and equality, so a pair that
/// is unordered but unequal (for example `NaN`) is `lt` and `lte`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComparisonHandler;

impl OperatorHandler for ComparisonHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        let attribute = scope.resolve_required(&condition.attribute)?;
        let (left, right) = (attribute.as_ref(), &condition.value);

        match operator {
            Operator::Eq => Ok(left == right),
            Operator::Neq => Ok(left != right),
            Operator::Gt => greater(operator, left, right),
            Operator::Gte => Ok(greater(operator, left, right)? || left == right),
            Operator::Lt => Ok(!greater(operator, left, right)? && left != right),
            Operator::Lte => Ok(!greater(operator, left, right)? || left == right),
            other => Err(EvalError::misrouted(other)),
        }
    }
}

fn greater(operator: Operator, left: &Value, right: &Value) -> Result<bool> {
    if let Ok(l) = to_time(left)
        && let Ok(r) = to_time(right)
    {
        return Ok(l > r);
    }

    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Ok(l > r),
        (Value::UInt(l), Value::UInt(r)) => Ok(l > r),
        (Value::Float(l), Value::Float(r)) => Ok(l > r),
        (Value::String(l), Value::String(r)) => Ok(l > r),
        _ if left.kind() != right.kind() => Err(EvalError::mismatch(
            operator,
            format!(
                "cannot compare different types: {} and {}",
                left.kind(),
                right.kind()
            ),
        )),
        _ => Err(EvalError::mismatch(
            operator,
            format!("unsupported type for comparison: {}", left.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attributes;
    use crate::error::ErrorKind;
    use crate::handlers::test_support::eval;
    use chrono::{TimeZone, Utc};
    use test_case::test_case;

    fn check(op: Operator, attr: impl Into<Value>, value: impl Into<Value>) -> Result<bool> {
        let attrs = Attributes::new().with("x", attr);
        eval(&Condition::leaf("x", op, value), &attrs)
    }

    #[test_case(Operator::Eq, 5, 5, true; "eq ints")]
    #[test_case(Operator::Eq, 5, 6, false; "eq different ints")]
    #[test_case(Operator::Neq, 5, 6, true; "neq ints")]
    #[test_case(Operator::Gt, 7, 3, true; "gt")]
    #[test_case(Operator::Gt, 3, 3, false; "gt equal")]
    #[test_case(Operator::Gte, 3, 3, true; "gte equal")]
    #[test_case(Operator::Lt, 2, 3, true; "lt")]
    #[test_case(Operator::Lt, 3, 3, false; "lt equal")]
    #[test_case(Operator::Lte, 3, 3, true; "lte equal")]
    #[test_case(Operator::Lte, 4, 3, false; "lte greater")]
    fn test_ints(op: Operator, attr: i64, value: i64, expected: bool) {
        assert_eq!(check(op, attr, value), Ok(expected));
    }

    #[test]
    fn test_equality_is_variant_sensitive() {
        assert_eq!(check(Operator::Eq, 5i64, 5u64), Ok(false));
        assert_eq!(check(Operator::Eq, 5i64, 5.0), Ok(false));
        assert_eq!(check(Operator::Eq, "5", 5), Ok(false));
        assert_eq!(check(Operator::Neq, 5i64, 5.0), Ok(true));
    }

    #[test]
    fn test_equality_on_aggregates() {
        assert_eq!(check(Operator::Eq, vec!["a", "b"], vec!["a", "b"]), Ok(true));
        assert_eq!(check(Operator::Eq, vec!["a", "b"], vec!["b", "a"]), Ok(false));
    }

    #[test]
    fn test_strings_order_lexically() {
        assert_eq!(check(Operator::Gt, "b", "a"), Ok(true));
        assert_eq!(check(Operator::Lt, "apple", "banana"), Ok(true));
    }

    #[test]
    fn test_times_compare_across_representations() {
        let noon = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(check(Operator::Gt, noon, "2024-01-01"), Ok(true));
        assert_eq!(check(Operator::Gt, "2024-01-02", noon), Ok(true));
        assert_eq!(check(Operator::Lt, "2024-01-01T11:00:00Z", noon), Ok(true));
    }

    #[test]
    fn test_epoch_integers_compare_as_times() {
        assert_eq!(check(Operator::Gt, 1_704_110_400, "2024-01-01"), Ok(true));
    }

    #[test]
    fn test_mixed_kinds_fail() {
        let err = check(Operator::Gt, 10, 2.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("cannot compare different types"));
    }

    #[test]
    fn test_unordered_kinds_fail() {
        let err = check(Operator::Gt, true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("unsupported type for comparison: bool"));
    }

    #[test]
    fn test_nan_ordering() {
        assert_eq!(check(Operator::Gt, f64::NAN, f64::NAN), Ok(false));
        assert_eq!(check(Operator::Eq, f64::NAN, f64::NAN), Ok(true));
        assert_eq!(check(Operator::Lt, f64::NAN, 1.0), Ok(true));
    }

    #[test_case(Operator::Eq, 0.0, -0.0, true; "eq across zero signs")]
    #[test_case(Operator::Gte, 0.0, -0.0, true; "gte across zero signs")]
    #[test_case(Operator::Lte, -0.0, 0.0, true; "lte across zero signs")]
    #[test_case(Operator::Lt, -0.0, 0.0, false; "negative zero is not less")]
    #[test_case(Operator::Gt, 0.0, -0.0, false; "positive zero is not greater")]
    fn test_signed_zero(op: Operator, attr: f64, value: f64, expected: bool) {
        assert_eq!(check(op, attr, value), Ok(expected));
    }

    #[test]
    fn test_missing_attribute() {
        let err = eval(&Condition::leaf("x", Operator::Eq, 1), &Attributes::new()).unwrap_err();
        assert_eq!(
            err,
            EvalError::MissingAttribute {
                attribute: "x".to_string()
            }
        );
    }

    #[test]
    fn test_present_null_is_not_missing() {
        assert_eq!(check(Operator::Neq, Value::Null, 1), Ok(true));
    }

    #[test]
    fn test_misrouted_operator() {
        let attrs = Attributes::new().with("x", 1);
        let engine = crate::Engine::new();
        let scope = Scope::new(&attrs, &engine);
        let cond = Condition::leaf("x", Operator::Contains, 1);

        assert_eq!(
            ComparisonHandler.eval(&cond, Operator::Contains, &scope),
            Err(EvalError::misrouted(Operator::Contains))
        );
    }
}
