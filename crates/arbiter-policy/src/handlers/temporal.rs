//! `before`, `after`.

use arbiter_types::Value;

use super::{OperatorHandler, Scope};
use crate::coerce::to_time;
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Strict instant ordering. Both operands must coerce to times.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemporalHandler;

impl OperatorHandler for TemporalHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        let attribute = scope.resolve_required(&condition.attribute)?;
        let coerce = |value: &Value| {
            to_time(value)
                .map_err(|source| EvalError::coercion(operator, &condition.attribute, source))
        };
        let (at, reference) = (coerce(attribute.as_ref())?, coerce(&condition.value)?);

        match operator {
            Operator::Before => Ok(at < reference),
            Operator::After => Ok(at > reference),
            other => Err(EvalError::misrouted(other)),
        }
    }
}
