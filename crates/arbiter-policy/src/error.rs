//! Evaluation errors.

use thiserror::Error;

use crate::coerce::CoercionError;
use crate::operator::{Operator, OperatorKind, describe_arity};
use crate::validate::ValidationError;

/// Error type for condition evaluation.
///
/// Every variant names the operator or attribute that triggered it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The operator tag is not in the registry.
    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },

    /// The operator is known but the engine has no handler for its kind.
    #[error("unsupported operator kind: {kind} (operator {operator})")]
    UnsupportedKind {
        operator: Operator,
        kind: OperatorKind,
    },

    /// A leaf operator that requires its attribute could not resolve it.
    #[error("missing required attribute: {attribute}")]
    MissingAttribute { attribute: String },

    /// A logical operator received the wrong number of child conditions.
    #[error(
        "operator {operator} expects {} conditions, got {actual}",
        describe_arity(*min, *max)
    )]
    Arity {
        operator: Operator,
        min: usize,
        max: Option<usize>,
        actual: usize,
    },

    /// Operand types cannot be reconciled for the operator.
    #[error("{reason} (operator {operator})")]
    TypeMismatch { operator: Operator, reason: String },

    /// A required coercion failed.
    #[error("operator {operator} on attribute {attribute}: {source}")]
    Coercion {
        operator: Operator,
        attribute: String,
        #[source]
        source: CoercionError,
    },

    /// A `matches` pattern failed to compile.
    #[error("invalid regular expression {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// `mod` with a zero divisor.
    #[error("modulo by zero (attribute {attribute})")]
    DivisionByZero { attribute: String },

    /// Malformed `between` operand.
    #[error("invalid between operand: {reason}")]
    InvalidBetweenSpec { reason: String },

    /// The condition was rejected before evaluation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Payload-free classification of an [`EvalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownOperator,
    UnsupportedKind,
    MissingAttribute,
    Arity,
    TypeMismatch,
    CoercionFailure,
    InvalidRegex,
    DivisionByZero,
    InvalidBetweenSpec,
    Invalid,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UnknownOperator { .. } => ErrorKind::UnknownOperator,
            EvalError::UnsupportedKind { .. } => ErrorKind::UnsupportedKind,
            EvalError::MissingAttribute { .. } => ErrorKind::MissingAttribute,
            EvalError::Arity { .. } => ErrorKind::Arity,
            EvalError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            EvalError::Coercion { .. } => ErrorKind::CoercionFailure,
            EvalError::InvalidRegex { .. } => ErrorKind::InvalidRegex,
            EvalError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            EvalError::InvalidBetweenSpec { .. } => ErrorKind::InvalidBetweenSpec,
            EvalError::Invalid(_) => ErrorKind::Invalid,
        }
    }

    pub(crate) fn missing(attribute: &str) -> Self {
        EvalError::MissingAttribute {
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn mismatch(operator: Operator, reason: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            operator,
            reason: reason.into(),
        }
    }

    pub(crate) fn coercion(operator: Operator, attribute: &str, source: CoercionError) -> Self {
        EvalError::Coercion {
            operator,
            attribute: attribute.to_string(),
            source,
        }
    }

    /// A handler was asked to evaluate an operator outside its kind.
    pub(crate) fn misrouted(operator: Operator) -> Self {
        EvalError::UnsupportedKind {
            operator,
            kind: operator.kind(),
        }
    }
}

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;
