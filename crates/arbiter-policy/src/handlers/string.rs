//! `contains`, `not_contains`, `starts_with`, `ends_with`, `matches`.

use arbiter_config::{DEFAULT_REGEX_SIZE_LIMIT, EngineConfig};
use regex::RegexBuilder;

use super::{OperatorHandler, Scope};
use crate::coerce::to_string;
use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;

/// Substring and pattern operators over the text form of both operands.
///
/// An absent attribute never matches, including for `not_contains`.
#[derive(Debug, Clone, Copy)]
pub struct StringHandler {
    regex_size_limit: usize,
}

impl Default for StringHandler {
    fn default() -> Self {
        Self {
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

impl StringHandler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            regex_size_limit: config.regex_size_limit,
        }
    }
}

impl OperatorHandler for StringHandler {
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool> {
        let Some(attribute) = scope.resolve(&condition.attribute) else {
            return Ok(false);
        };
        let haystack = to_string(&attribute)
            .map_err(|source| EvalError::coercion(operator, &condition.attribute, source))?;
        let needle = to_string(&condition.value)
            .map_err(|source| EvalError::coercion(operator, &condition.attribute, source))?;

        match operator {
            Operator::Contains => Ok(haystack.contains(&needle)),
            Operator::NotContains => Ok(!haystack.contains(&needle)),
            Operator::StartsWith => Ok(haystack.starts_with(&needle)),
            Operator::EndsWith => Ok(haystack.ends_with(&needle)),
            Operator::Matches => {
                let pattern = RegexBuilder::new(&needle)
                    .size_limit(self.regex_size_limit)
                    .build()
                    .map_err(|source| EvalError::InvalidRegex {
                        pattern: needle.clone(),
                        source,
                    })?;
                Ok(pattern.is_match(&haystack))
            }
            other => Err(EvalError::misrouted(other)),
        }
    }
}
