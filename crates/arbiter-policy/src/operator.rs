//! Operator registry.
//!
//! Every operator a [`Condition`](crate::Condition) may name is listed here
//! together with the handler kind it dispatches to and its arity bounds.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Operator
// ============================================================================

/// A known condition operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    // Comparison
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    // Range
    Between,
    // String
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Matches,
    // Temporal
    Before,
    After,
    // Arithmetic
    Mod,
    // Logical
    And,
    Or,
    Not,
    // Set
    In,
    Nin,
    Subset,
    NotSubset,
    Intersects,
    Disjoint,
}

impl Operator {
    pub const ALL: [Operator; 24] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Between,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Matches,
        Operator::Before,
        Operator::After,
        Operator::Mod,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::In,
        Operator::Nin,
        Operator::Subset,
        Operator::NotSubset,
        Operator::Intersects,
        Operator::Disjoint,
    ];

    /// The wire tag for this operator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Between => "between",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Matches => "matches",
            Operator::Before => "before",
            Operator::After => "after",
            Operator::Mod => "mod",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Subset => "subset",
            Operator::NotSubset => "not_subset",
            Operator::Intersects => "intersects",
            Operator::Disjoint => "disjoint",
        }
    }

    /// Registry entry for this operator.
    pub const fn spec(self) -> OperatorSpec {
        match self {
            Operator::Eq
            | Operator::Neq
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte => OperatorSpec::leaf(OperatorKind::Comparison),
            Operator::Between => OperatorSpec {
                kind: OperatorKind::Range,
                min_args: 2,
                max_args: Some(3),
            },
            Operator::Contains
            | Operator::NotContains
            | Operator::StartsWith
            | Operator::EndsWith
            | Operator::Matches => OperatorSpec::leaf(OperatorKind::String),
            Operator::Before | Operator::After => OperatorSpec::leaf(OperatorKind::Temporal),
            Operator::Mod => OperatorSpec::leaf(OperatorKind::Arithmetic),
            Operator::And | Operator::Or => OperatorSpec::logical(2, None),
            Operator::Not => OperatorSpec::logical(1, Some(1)),
            Operator::In
            | Operator::Nin
            | Operator::Subset
            | Operator::NotSubset
            | Operator::Intersects
            | Operator::Disjoint => OperatorSpec::leaf(OperatorKind::Set),
        }
    }

    pub const fn kind(self) -> OperatorKind {
        self.spec().kind
    }

    pub const fn is_logical(self) -> bool {
        matches!(self.kind(), OperatorKind::Logical)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tag does not name a known operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator: {0}")]
pub struct ParseOperatorError(pub String);

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseOperatorError(s.to_string()))
    }
}

// ============================================================================
// Kinds and arity
// ============================================================================

/// Handler family an operator dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Comparison,
    Range,
    Set,
    String,
    Temporal,
    Arithmetic,
    Logical,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 7] = [
        OperatorKind::Comparison,
        OperatorKind::Range,
        OperatorKind::Set,
        OperatorKind::String,
        OperatorKind::Temporal,
        OperatorKind::Arithmetic,
        OperatorKind::Logical,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Comparison => "comparison",
            OperatorKind::Range => "range",
            OperatorKind::Set => "set",
            OperatorKind::String => "string",
            OperatorKind::Temporal => "temporal",
            OperatorKind::Arithmetic => "arithmetic",
            OperatorKind::Logical => "logical",
        }
    }
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry: handler kind plus arity bounds.
///
/// For logical operators the bounds count child conditions. For leaves they
/// count operands: the attribute and the value, plus the optional inclusive
/// flag of `between`. `max_args` of `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    pub kind: OperatorKind,
    pub min_args: usize,
    pub max_args: Option<usize>,
}

impl OperatorSpec {
    const fn leaf(kind: OperatorKind) -> Self {
        Self {
            kind,
            min_args: 2,
            max_args: Some(2),
        }
    }

    const fn logical(min_args: usize, max_args: Option<usize>) -> Self {
        Self {
            kind: OperatorKind::Logical,
            min_args,
            max_args,
        }
    }

    /// Looks up the registry entry for a raw tag.
    pub fn lookup(tag: &str) -> Option<(Operator, OperatorSpec)> {
        tag.parse::<Operator>().ok().map(|op| (op, op.spec()))
    }

    /// Whether `count` children (or operands, for leaves) satisfy this entry.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }
}

pub(crate) fn describe_arity(min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) if max == min => format!("exactly {min}"),
        Some(max) => format!("between {min} and {max}"),
        None => format!("at least {min}"),
    }
}

// ============================================================================
// OperatorTag
// ============================================================================

/// The operator as written in a condition document.
///
/// Tags are kept verbatim so that unknown operators survive parsing and are
/// reported by the validator or the engine rather than by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorTag(String);

impl OperatorTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the tag against the registry.
    pub fn operator(&self) -> Option<Operator> {
        self.0.parse().ok()
    }
}

impl From<Operator> for OperatorTag {
    fn from(op: Operator) -> Self {
        Self(op.as_str().to_string())
    }
}

impl From<&str> for OperatorTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl From<String> for OperatorTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl PartialEq<Operator> for OperatorTag {
    fn eq(&self, other: &Operator) -> bool {
        self.0 == other.as_str()
    }
}

impl Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
