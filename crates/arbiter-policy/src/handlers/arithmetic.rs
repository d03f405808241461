//! `mod`.

use arbiter_config::{DEFAULT_MOD_TOLERANCE, EngineConfig};
use arbiter_types::Value;

use super::{OperatorHandler, Scope};
use crate::coerce::to_number;
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Divisibility with a float tolerance: holds when `|attribute % value|` is
/// strictly below the tolerance.
#[derive(Debug, Clone, Copy)]
pub struct ArithmeticHandler {
    tolerance: f64,
}

impl Default for ArithmeticHandler {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MOD_TOLERANCE,
        }
    }
}

impl ArithmeticHandler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tolerance: config.mod_tolerance,
        }
    }
}

impl OperatorHandler for ArithmeticHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        if operator != Operator::Mod {
            return Err(EvalError::misrouted(operator));
        }

        let attribute = scope.resolve_required(&condition.attribute)?;
        let coerce = |value: &Value| {
            to_number(value)
                .map_err(|source| EvalError::coercion(operator, &condition.attribute, source))
        };
        let dividend = coerce(attribute.as_ref())?;
        let divisor = coerce(&condition.value)?;

        if divisor == 0.0 {
            return Err(EvalError::DivisionByZero {
                attribute: condition.attribute.clone(),
            });
        }
        Ok((dividend % divisor).abs() < self.tolerance)
    }
}
