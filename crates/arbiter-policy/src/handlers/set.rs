//! `in`, `nin`, `subset`, `not_subset`, `intersects`, `disjoint`.

use std::collections::HashSet;

use arbiter_types::Value;

use super::{OperatorHandler, Scope};
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Membership and set relations using structural equality.
///
/// `in` and `nin` test whether the attribute is a member of the condition
/// value (a list element or a map key). The relational operators require
/// both sides to be lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetHandler;

impl OperatorHandler for SetHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        let Some(attribute) = scope.resolve(&condition.attribute) else {
            // An absent attribute is a member of nothing.
            return Ok(operator == Operator::Nin);
        };
        let (attribute, value) = (attribute.as_ref(), &condition.value);

        match operator {
            Operator::In => Ok(has_member(value, attribute)),
            Operator::Nin => Ok(!has_member(value, attribute)),
            Operator::Subset => is_subset(operator, attribute, value),
            Operator::NotSubset => Ok(!is_subset(operator, attribute, value)?),
            Operator::Intersects => intersects(operator, attribute, value),
            Operator::Disjoint => Ok(!intersects(operator, attribute, value)?),
            other => Err(EvalError::misrouted(other)),
        }
    }
}

fn has_member(collection: &Value, item: &Value) -> bool {
    match collection {
        Value::List(items) => items.contains(item),
        Value::Map(map) => item.as_str().is_some_and(|key| map.contains_key(key)),
        _ => false,
    }
}

fn as_list<'v>(operator: Operator, value: &'v Value, role: &str) -> Result<&'v [Value]> {
    value.as_list().ok_or_else(|| {
        EvalError::mismatch(operator, format!("{role} must be a list, got {}", value.kind()))
    })
}

/// Every element of the attribute list is in the value list.
fn is_subset(operator: Operator, attribute: &Value, value: &Value) -> Result<bool> {
    let subset = as_list(operator, attribute, "subset")?;
    let superset: HashSet<&Value> = as_list(operator, value, "superset")?.iter().collect();
    Ok(subset.iter().all(|item| superset.contains(item)))
}

fn intersects(operator: Operator, attribute: &Value, value: &Value) -> Result<bool> {
    let left = as_list(operator, attribute, "first set")?;
    let right = as_list(operator, value, "second set")?;
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    let members: HashSet<&Value> = small.iter().collect();
    Ok(large.iter().any(|item| members.contains(item)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attributes;
    use crate::error::ErrorKind;
    use crate::handlers::test_support::eval;
    use serde_json::json;
    use test_case::test_case;

    fn check(op: Operator, attr: impl Into<Value>, value: impl Into<Value>) -> Result<bool> {
        let attrs = Attributes::new().with("s", attr);
        eval(&Condition::leaf("s", op, value), &attrs)
    }

    #[test_case(Operator::In, json!("a"), json!(["a", "b"]), true; "in list")]
    #[test_case(Operator::In, json!("c"), json!(["a", "b"]), false; "in list miss")]
    #[test_case(Operator::In, json!("a"), json!({ "a": 1 }), true; "in map keys")]
    #[test_case(Operator::In, json!(1), json!({ "a": 1 }), false; "map values are not members")]
    #[test_case(Operator::In, json!("a"), json!("abc"), false; "scalar value contains nothing")]
    #[test_case(Operator::In, json!([1, 2]), json!([[1, 2], 3]), true; "list member")]
    #[test_case(Operator::In, json!(1.0), json!([1, 2]), false; "member equality is variant sensitive")]
    #[test_case(Operator::Nin, json!("b"), json!(["a"]), true; "nin")]
    #[test_case(Operator::Nin, json!("a"), json!(["a"]), false; "nin member")]
    #[test_case(Operator::Subset, json!(["a"]), json!(["a", "b"]), true; "subset")]
    #[test_case(Operator::Subset, json!([]), json!(["a"]), true; "empty subset")]
    #[test_case(Operator::Subset, json!(["a", "c"]), json!(["a", "b"]), false; "not a subset")]
    #[test_case(Operator::NotSubset, json!(["a", "c"]), json!(["a", "b"]), true; "not_subset")]
    #[test_case(Operator::Intersects, json!([1, 2, 3]), json!([3, 4]), true; "intersects")]
    #[test_case(Operator::Intersects, json!([]), json!([1]), false; "empty never intersects")]
    #[test_case(Operator::Disjoint, json!([1, 2]), json!([3, 4]), true; "disjoint")]
    #[test_case(Operator::Disjoint, json!([1, 2]), json!([2]), false; "overlap is not disjoint")]
    fn test_set_ops(op: Operator, attr: serde_json::Value, value: serde_json::Value, expected: bool) {
        assert_eq!(check(op, attr, value), Ok(expected));
    }

    #[test_case(Operator::In, false; "in")]
    #[test_case(Operator::Nin, true; "nin")]
    #[test_case(Operator::Subset, false; "subset")]
    #[test_case(Operator::NotSubset, false; "not_subset")]
    #[test_case(Operator::Intersects, false; "intersects")]
    #[test_case(Operator::Disjoint, false; "disjoint")]
    fn test_absent_attribute(op: Operator, expected: bool) {
        let cond = Condition::leaf("missing", op, json!(["a"]));
        assert_eq!(eval(&cond, &Attributes::new()), Ok(expected));
    }

    #[test]
    fn test_relations_require_lists() {
        let err = check(Operator::Subset, "a", json!(["a"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("subset must be a list, got string"));

        let err = check(Operator::Disjoint, json!([1]), 1).unwrap_err();
        assert!(err.to_string().contains("second set must be a list, got int"));
    }
}
