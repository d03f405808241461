//! Condition trees.

use arbiter_types::Value;
use serde::{Deserialize, Serialize};

use crate::operator::{Operator, OperatorTag};
use crate::validate::{ValidationError, Validator};

/// A node in a condition tree.
///
/// Leaves compare the attribute named by `attribute` against `value` using
/// `operator`. Logical nodes (`and`, `or`, `not`) ignore `attribute` and
/// `value` and combine their `conditions` instead.
///
/// All fields default when absent from a document, so a partially specified
/// node decodes and is rejected later by [`Condition::validate`] or the
/// engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub attribute: String,
    #[serde(default)]
    pub operator: OperatorTag,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Condition {
    /// Creates a leaf condition.
    pub fn leaf(attribute: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.into(),
            value: value.into(),
            conditions: Vec::new(),
        }
    }

    /// Creates a logical node over `conditions`.
    pub fn logical(operator: Operator, conditions: Vec<Condition>) -> Self {
        Self {
            attribute: String::new(),
            operator: operator.into(),
            value: Value::Null,
            conditions,
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Self::logical(Operator::And, conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::logical(Operator::Or, conditions)
    }

    pub fn not(condition: Condition) -> Self {
        Self::logical(Operator::Not, vec![condition])
    }

    /// The parsed operator, if the tag is known.
    pub fn operator(&self) -> Option<Operator> {
        self.operator.operator()
    }

    pub fn is_logical(&self) -> bool {
        self.operator().is_some_and(Operator::is_logical)
    }

    /// Number of levels in this tree. A single leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .conditions
            .iter()
            .map(Condition::depth)
            .max()
            .unwrap_or(0)
    }

    /// Checks the tree with the default [`Validator`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validator::default().validate(self)
    }
}
