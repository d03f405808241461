//! `between`.

use arbiter_types::Value;

use super::{OperatorHandler, Scope};
use crate::coerce::{to_number, to_string, to_time};
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Range membership.
///
/// The condition value is either `[min, max]`, `[min, max, inclusive]` or
/// `{"min": .., "max": .., "inclusive": ..}`; bounds are inclusive unless
/// stated otherwise. Operands are compared as times, then numbers, then
/// text, using the first interpretation all three accept. Only a null
/// operand defeats all three.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeHandler;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds<'a> {
    min: &'a Value,
    max: &'a Value,
    inclusive: bool,
}

impl<'a> Bounds<'a> {
    fn parse(value: &'a Value) -> Result<Self> {
        let (min, max, flag) = match value {
            Value::Null => return Err(invalid("between requires min and max")),
            Value::List(items) => match items.as_slice() {
                [min, max] => (min, max, None),
                [min, max, flag] => (min, max, Some(flag)),
                _ => {
                    return Err(invalid(
                        "between requires 2 or 3 elements: min, max, inclusive",
                    ));
                }
            },
            Value::Map(map) => match (map.get("min"), map.get("max")) {
                (Some(min), Some(max)) => (min, max, map.get("inclusive")),
                _ => return Err(invalid("between requires min and max keys")),
            },
            other => {
                return Err(invalid(format!(
                    "unsupported between value type: {}",
                    other.kind()
                )));
            }
        };

        let inclusive = match flag {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(invalid(format!(
                    "inclusive flag must be a bool, got {}",
                    other.kind()
                )));
            }
        };

        Ok(Self {
            min,
            max,
            inclusive,
        })
    }
}

fn invalid(reason: impl Into<String>) -> EvalError {
    EvalError::InvalidBetweenSpec {
        reason: reason.into(),
    }
}

fn within<T: PartialOrd>(x: &T, min: &T, max: &T, inclusive: bool) -> bool {
    if inclusive {
        min <= x && x <= max
    } else {
        min < x && x < max
    }
}

impl OperatorHandler for RangeHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        if operator != Operator::Between {
            return Err(EvalError::misrouted(operator));
        }

        let attribute = scope.resolve_required(&condition.attribute)?;
        let x = attribute.as_ref();
        let Bounds {
            min,
            max,
            inclusive,
        } = Bounds::parse(&condition.value)?;

        if let (Ok(t), Ok(lo), Ok(hi)) = (to_time(x), to_time(min), to_time(max)) {
            return Ok(within(&t, &lo, &hi, inclusive));
        }

        if let (Ok(n), Ok(lo), Ok(hi)) = (to_number(x), to_number(min), to_number(max)) {
            // An inverted numeric range is empty rather than an error.
            if lo > hi {
                return Ok(false);
            }
            return Ok(within(&n, &lo, &hi, inclusive));
        }

        if let (Ok(s), Ok(lo), Ok(hi)) = (to_string(x), to_string(min), to_string(max)) {
            if lo > hi {
                return Ok(false);
            }
            return Ok(within(&s, &lo, &hi, inclusive));
        }

        Err(EvalError::mismatch(
            operator,
            format!(
                "mismatched types for between: {}, {}, {}",
                x.kind(),
                min.kind(),
                max.kind()
            ),
        ))
    }
}
