//! Operator handlers.
//!
//! Each handler evaluates the operators of one [`OperatorKind`]. Handlers are
//! stateless apart from engine tunables and receive a [`Scope`] through which
//! they resolve attributes and, for logical operators, evaluate children.
//!
//! [`OperatorKind`]: crate::OperatorKind

use std::borrow::Cow;

use arbiter_types::Value;

use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::operator::Operator;
use crate::resolver::Resolver;

mod arithmetic;
mod comparison;
mod logical;
mod range;
mod set;
mod string;
mod temporal;

pub use arithmetic::ArithmeticHandler;
pub use comparison::ComparisonHandler;
pub use logical::LogicalHandler;
pub use range::RangeHandler;
pub use set::SetHandler;
pub use string::StringHandler;
pub use temporal::TemporalHandler;

/// Evaluates whole conditions. Implemented by the engine.
pub trait Evaluate {
    fn evaluate(&self, condition: &Condition, resolver: &dyn Resolver) -> Result<bool>;
}

/// Evaluates the operators of a single kind.
pub trait OperatorHandler: Send + Sync {
    /// Evaluates `condition`, whose tag has already been parsed as `operator`.
    fn eval(&self, condition: &Condition, operator: Operator, scope: &Scope<'_>) -> Result<bool>;
}

/// What a handler can see during one evaluation.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    resolver: &'a dyn Resolver,
    evaluator: &'a dyn Evaluate,
}

impl<'a> Scope<'a> {
    pub fn new(resolver: &'a dyn Resolver, evaluator: &'a dyn Evaluate) -> Self {
        Self {
            resolver,
            evaluator,
        }
    }

    pub fn resolver(&self) -> &'a dyn Resolver {
        self.resolver
    }

    /// Resolves an attribute; `None` when absent.
    pub fn resolve(&self, attribute: &str) -> Option<Cow<'a, Value>> {
        self.resolver.resolve(attribute)
    }

    /// Resolves an attribute the operator cannot do without.
    pub fn resolve_required(&self, attribute: &str) -> Result<Cow<'a, Value>> {
        self.resolve(attribute)
            .ok_or_else(|| EvalError::missing(attribute))
    }

    /// Evaluates a child condition with the same resolver.
    pub fn evaluate(&self, condition: &Condition) -> Result<bool> {
        self.evaluator.evaluate(condition, self.resolver)
    }
}
