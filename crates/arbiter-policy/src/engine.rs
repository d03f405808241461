//! Condition evaluation engine.
//!
//! The engine owns one handler per [`OperatorKind`] and dispatches every node
//! of a condition tree to the handler for its operator's kind. Logical
//! handlers recurse back into the engine through their [`Scope`].

use std::collections::HashMap;
use std::fmt;

use arbiter_config::EngineConfig;
use tracing::{debug, trace};

use crate::condition::Condition;
use crate::error::{EvalError, Result};
use crate::handlers::{
    ArithmeticHandler, ComparisonHandler, Evaluate, LogicalHandler, OperatorHandler, RangeHandler,
    Scope, SetHandler, StringHandler, TemporalHandler,
};
use crate::operator::OperatorKind;
use crate::resolver::Resolver;
use crate::validate::{ValidationError, Validator};

/// Evaluates condition trees against a [`Resolver`].
///
/// An engine holds no per-evaluation state and may be shared across threads.
///
/// ```
/// use arbiter_policy::{Attributes, Condition, Engine, Operator};
///
/// let engine = Engine::new();
/// let attrs = Attributes::new().with("user.age", 30);
/// let cond = Condition::leaf("user.age", Operator::Gte, 18);
///
/// assert_eq!(engine.eval(&cond, &attrs), Ok(true));
/// ```
pub struct Engine {
    handlers: HashMap<OperatorKind, Box<dyn OperatorHandler>>,
    validator: Validator,
}

impl Engine {
    /// Creates an engine with every built-in handler and default tunables.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Creates an engine with every built-in handler.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::empty(config)
            .with_handler(OperatorKind::Comparison, ComparisonHandler)
            .with_handler(OperatorKind::Range, RangeHandler)
            .with_handler(OperatorKind::Set, SetHandler)
            .with_handler(OperatorKind::String, StringHandler::new(config))
            .with_handler(OperatorKind::Temporal, TemporalHandler)
            .with_handler(OperatorKind::Arithmetic, ArithmeticHandler::new(config))
            .with_handler(OperatorKind::Logical, LogicalHandler)
    }

    /// Creates an engine with no handlers registered.
    pub fn empty(config: &EngineConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            validator: Validator::from_config(config),
        }
    }

    /// Installs `handler` for `kind`, returning the handler it replaces.
    pub fn register(
        &mut self,
        kind: OperatorKind,
        handler: impl OperatorHandler + 'static,
    ) -> Option<Box<dyn OperatorHandler>> {
        self.handlers.insert(kind, Box::new(handler))
    }

    /// Builder form of [`Engine::register`].
    pub fn with_handler(
        mut self,
        kind: OperatorKind,
        handler: impl OperatorHandler + 'static,
    ) -> Self {
        self.register(kind, handler);
        self
    }

    pub fn handles(&self, kind: OperatorKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Evaluates `condition` without validating it first.
    ///
    /// Recursion follows the tree's nesting with no depth bound. Trees from
    /// untrusted sources should go through [`eval_validated`](Self::eval_validated),
    /// which rejects anything deeper than the configured
    /// `max_condition_depth` before evaluating.
    pub fn eval(&self, condition: &Condition, resolver: &dyn Resolver) -> Result<bool> {
        let Some(operator) = condition.operator() else {
            debug!(operator = %condition.operator, "Unknown operator");
            return Err(EvalError::UnknownOperator {
                operator: condition.operator.as_str().to_string(),
            });
        };

        let kind = operator.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            debug!(%operator, %kind, "No handler registered");
            return Err(EvalError::UnsupportedKind { operator, kind });
        };

        trace!(%operator, attribute = %condition.attribute, "Evaluating condition");
        let scope = Scope::new(resolver, self);
        let result = handler.eval(condition, operator, &scope);

        if let Err(err) = &result {
            debug!(%operator, attribute = %condition.attribute, error = %err, "Condition failed");
        }
        result
    }

    /// Checks `condition` with this engine's depth limit.
    pub fn validate(&self, condition: &Condition) -> std::result::Result<(), ValidationError> {
        self.validator.validate(condition)
    }

    /// Validates `condition`, then evaluates it.
    pub fn eval_validated(&self, condition: &Condition, resolver: &dyn Resolver) -> Result<bool> {
        self.validate(condition)?;
        self.eval(condition, resolver)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluate for Engine {
    fn evaluate(&self, condition: &Condition, resolver: &dyn Resolver) -> Result<bool> {
        self.eval(condition, resolver)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("Engine")
            .field("handlers", &kinds)
            .field("validator", &self.validator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attributes;
    use crate::error::ErrorKind;
    use crate::operator::Operator;

    #[test]
    fn test_all_kinds_registered() {
        let engine = Engine::new();
        for kind in OperatorKind::ALL {
            assert!(engine.handles(kind), "{kind}");
        }
    }

    #[test]
    fn test_unknown_operator() {
        let mut cond = Condition::leaf("a", Operator::Eq, 1);
        cond.operator = "approx".into();

        assert_eq!(
            Engine::new().eval(&cond, &Attributes::new()),
            Err(EvalError::UnknownOperator {
                operator: "approx".to_string()
            })
        );
    }

    #[test]
    fn test_unregistered_kind() {
        let engine = Engine::empty(&EngineConfig::default())
            .with_handler(OperatorKind::Comparison, ComparisonHandler);
        let attrs = Attributes::new().with("a", "abc");

        assert_eq!(
            engine.eval(&Condition::leaf("a", Operator::Eq, "abc"), &attrs),
            Ok(true)
        );
        assert_eq!(
            engine.eval(&Condition::leaf("a", Operator::Contains, "b"), &attrs),
            Err(EvalError::UnsupportedKind {
                operator: Operator::Contains,
                kind: OperatorKind::String,
            })
        );
    }

    /// Treats every set operator as unconditionally true.
    struct AlwaysTrue;

    impl OperatorHandler for AlwaysTrue {
        fn eval(&self, _: &Condition, _: Operator, _: &Scope<'_>) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_register_replaces_handler() {
        let mut engine = Engine::new();
        let previous = engine.register(OperatorKind::Set, AlwaysTrue);
        assert!(previous.is_some());

        let cond = Condition::leaf("absent", Operator::In, "x");
        assert_eq!(engine.eval(&cond, &Attributes::new()), Ok(true));
    }

    #[test]
    fn test_custom_handler_nested_under_logical() {
        let engine = Engine::new().with_handler(OperatorKind::Set, AlwaysTrue);
        let cond = Condition::not(Condition::leaf("absent", Operator::Subset, "x"));
        assert_eq!(engine.eval(&cond, &Attributes::new()), Ok(false));
    }

    #[test]
    fn test_eval_validated() {
        let engine = Engine::new();
        let attrs = Attributes::new().with("a", 1);

        // Evaluates fine without validation, but the value is missing.
        let cond = Condition::leaf("a", Operator::Neq, arbiter_types::Value::Null);
        assert_eq!(engine.eval(&cond, &attrs), Ok(true));

        let err = engine.eval_validated(&cond, &attrs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(matches!(
            err,
            EvalError::Invalid(ValidationError::MissingValue { .. })
        ));
    }

    #[test]
    fn test_validator_follows_config() {
        let config = EngineConfig {
            max_condition_depth: 2,
            ..Default::default()
        };
        let engine = Engine::with_config(&config);
        let cond = Condition::not(Condition::not(Condition::leaf("a", Operator::Eq, 1)));

        assert!(matches!(
            engine.validate(&cond),
            Err(ValidationError::TooDeep { max_depth: 2, .. })
        ));
        assert_eq!(engine.eval(&cond, &Attributes::new().with("a", 1)), Ok(true));
    }

    #[test]
    fn test_eval_validated_stops_deep_trees_before_evaluating() {
        let mut cond = Condition::leaf("a", Operator::Eq, 1);
        for _ in 0..10_000 {
            cond = Condition::not(cond);
        }

        let err = Engine::new()
            .eval_validated(&cond, &Attributes::new().with("a", 1))
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::Invalid(ValidationError::TooDeep { max_depth: 64, .. })
        ));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_debug_lists_kinds() {
        let rendered = format!("{:?}", Engine::new());
        assert!(rendered.contains("comparison"));
        assert!(rendered.contains("logical"));
    }
}
