//! Structural validation of condition trees.
//!
//! Validation checks the shape of a tree without resolving attributes:
//! every operator is known, logical nodes have a legal number of children,
//! and leaves name an attribute and carry a value.

use arbiter_config::{DEFAULT_MAX_CONDITION_DEPTH, EngineConfig};
use thiserror::Error;
use tracing::debug;

use crate::condition::Condition;
use crate::operator::{Operator, describe_arity};

/// Location of a node, e.g. `$.conditions[1].conditions[0]`.
const ROOT_PATH: &str = "$";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{path}: unknown operator: {operator:?}")]
    UnknownOperator { path: String, operator: String },

    #[error(
        "{path}: operator {operator} expects {} conditions, got {actual}",
        describe_arity(*min, *max)
    )]
    Arity {
        path: String,
        operator: Operator,
        min: usize,
        max: Option<usize>,
        actual: usize,
    },

    #[error("{path}: operator {operator} requires an attribute")]
    MissingAttribute { path: String, operator: Operator },

    #[error("{path}: operator {operator} requires a value")]
    MissingValue { path: String, operator: Operator },

    #[error("{path}: malformed attribute name {attribute:?}")]
    MalformedAttribute { path: String, attribute: String },

    #[error("{path}: conditions nested deeper than {max_depth}")]
    TooDeep { path: String, max_depth: usize },
}

impl ValidationError {
    /// Path of the offending node.
    pub fn path(&self) -> &str {
        match self {
            ValidationError::UnknownOperator { path, .. }
            | ValidationError::Arity { path, .. }
            | ValidationError::MissingAttribute { path, .. }
            | ValidationError::MissingValue { path, .. }
            | ValidationError::MalformedAttribute { path, .. }
            | ValidationError::TooDeep { path, .. } => path,
        }
    }
}

/// Checks condition trees for structural errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    max_depth: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONDITION_DEPTH)
    }
}

impl Validator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_condition_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Validates `condition`, reporting the first offending node in
    /// depth-first order.
    pub fn validate(&self, condition: &Condition) -> Result<(), ValidationError> {
        let result = self.check(condition, ROOT_PATH, 1);
        if let Err(err) = &result {
            debug!(path = %err.path(), error = %err, "Condition rejected");
        }
        result
    }

    fn check(&self, condition: &Condition, path: &str, depth: usize) -> Result<(), ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::TooDeep {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }

        let Some(operator) = condition.operator() else {
            return Err(ValidationError::UnknownOperator {
                path: path.to_string(),
                operator: condition.operator.as_str().to_string(),
            });
        };

        if operator.is_logical() {
            let spec = operator.spec();
            let actual = condition.conditions.len();
            if !spec.accepts(actual) {
                return Err(ValidationError::Arity {
                    path: path.to_string(),
                    operator,
                    min: spec.min_args,
                    max: spec.max_args,
                    actual,
                });
            }
            for (i, child) in condition.conditions.iter().enumerate() {
                self.check(child, &format!("{path}.conditions[{i}]"), depth + 1)?;
            }
            return Ok(());
        }

        if condition.attribute.is_empty() {
            return Err(ValidationError::MissingAttribute {
                path: path.to_string(),
                operator,
            });
        }
        if condition.attribute.split('.').any(str::is_empty) {
            return Err(ValidationError::MalformedAttribute {
                path: path.to_string(),
                attribute: condition.attribute.clone(),
            });
        }
        if condition.value.is_null() {
            return Err(ValidationError::MissingValue {
                path: path.to_string(),
                operator,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_types::Value;
    use test_case::test_case;

    fn leaf(attribute: &str, value: impl Into<Value>) -> Condition {
        Condition::leaf(attribute, Operator::Eq, value)
    }

    #[test]
    fn test_valid_tree() {
        let cond = Condition::and(vec![
            leaf("user.role", "admin"),
            Condition::or(vec![
                leaf("a", 1),
                Condition::not(Condition::leaf("tags", Operator::In, "x")),
            ]),
        ]);
        assert_eq!(cond.validate(), Ok(()));
    }

    #[test]
    fn test_unknown_operator_path() {
        let mut bad = leaf("a", 1);
        bad.operator = "xor".into();
        let cond = Condition::and(vec![leaf("a", 1), Condition::or(vec![bad, leaf("b", 2)])]);

        assert_eq!(
            cond.validate(),
            Err(ValidationError::UnknownOperator {
                path: "$.conditions[1].conditions[0]".to_string(),
                operator: "xor".to_string(),
            })
        );
    }

    #[test_case(Condition::and(vec![]), Operator::And, 0; "empty and")]
    #[test_case(Condition::or(vec![]), Operator::Or, 0; "empty or")]
    #[test_case(Condition::and(vec![leaf("a", 1)]), Operator::And, 1; "and with one")]
    #[test_case(Condition::or(vec![leaf("a", 1)]), Operator::Or, 1; "or with one")]
    #[test_case(Condition::logical(Operator::Not, vec![]), Operator::Not, 0; "empty not")]
    #[test_case(Condition::logical(Operator::Not, vec![leaf("a", 1), leaf("b", 2)]), Operator::Not, 2; "not with two")]
    fn test_arity(cond: Condition, operator: Operator, actual: usize) {
        let err = cond.validate().unwrap_err();
        assert!(
            matches!(err, ValidationError::Arity { operator: op, actual: n, .. } if op == operator && n == actual),
            "{err}"
        );
        assert_eq!(err.path(), "$");
    }

    #[test]
    fn test_leaf_requirements() {
        assert_eq!(
            leaf("", 1).validate(),
            Err(ValidationError::MissingAttribute {
                path: "$".to_string(),
                operator: Operator::Eq,
            })
        );
        assert_eq!(
            leaf("a", Value::Null).validate(),
            Err(ValidationError::MissingValue {
                path: "$".to_string(),
                operator: Operator::Eq,
            })
        );
        assert_eq!(
            leaf("a..b", 1).validate(),
            Err(ValidationError::MalformedAttribute {
                path: "$".to_string(),
                attribute: "a..b".to_string(),
            })
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut cond = leaf("a", 1);
        for _ in 0..4 {
            cond = Condition::not(cond);
        }
        assert_eq!(cond.depth(), 5);
        assert_eq!(Validator::new(5).validate(&cond), Ok(()));

        let err = Validator::new(4).validate(&cond).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooDeep {
                path: "$.conditions[0].conditions[0].conditions[0].conditions[0]".to_string(),
                max_depth: 4,
            }
        );
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig {
            max_condition_depth: 3,
            ..Default::default()
        };
        assert_eq!(Validator::from_config(&config).max_depth(), 3);
    }
}
