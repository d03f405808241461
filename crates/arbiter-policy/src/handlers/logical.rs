//! `and`, `or`, `not`.

use tracing::trace;

use super::{OperatorHandler, Scope};
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Combines child conditions, evaluated in order through the scope.
///
/// - `and` stops at the first `false` child and propagates the first error.
/// - `or` stops at the first `true` child. Errors from earlier children are
///   swallowed if a later child holds; otherwise the last error is returned.
/// - `not` requires exactly one child.
///
/// With no children, `and` holds and `or` does not.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogicalHandler;

impl OperatorHandler for LogicalHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        let children = &condition.conditions;

        match operator {
            Operator::And => {
                for (index, child) in children.iter().enumerate() {
                    if !scope.evaluate(child)? {
                        let remaining = children.len() - index - 1;
                        trace!(index, remaining, "and short-circuited");
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Operator::Or => {
                let mut last_error = None;
                for (index, child) in children.iter().enumerate() {
                    match scope.evaluate(child) {
                        Ok(true) => {
                            let remaining = children.len() - index - 1;
                            trace!(index, remaining, "or short-circuited");
                            return Ok(true);
                        }
                        Ok(false) => {}
                        Err(err) => last_error = Some(err),
                    }
                }
                last_error.map_or(Ok(false), Err)
            }
            Operator::Not => match children.as_slice() {
                [child] => Ok(!scope.evaluate(child)?),
                _ => Err(EvalError::Arity {
                    operator,
                    min: 1,
                    max: Some(1),
                    actual: children.len(),
                }),
            },
            other => Err(EvalError::misrouted(other)),
        }
    }
}
