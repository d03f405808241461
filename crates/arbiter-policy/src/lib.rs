//! # arbiter-policy: Attribute-based condition evaluation
//!
//! Evaluates declarative condition trees against a set of attributes and
//! returns a boolean verdict, or an error explaining why no verdict exists.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Condition tree           Attributes          │
//! │  (and / or / not, leaves) (Resolver)          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Engine                                       │
//! │  ├─ Parse the operator tag (registry)         │
//! │  ├─ Route to the handler for its kind         │
//! │  └─ Logical handlers recurse via Scope        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Handlers                                     │
//! │  comparison · range · set · string ·          │
//! │  temporal · arithmetic · logical              │
//! │  (resolve attribute, coerce, compare)         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Validation is separate from evaluation: [`Engine::eval`] trusts its
//! input, [`Validator`] (or [`Engine::eval_validated`]) checks tree shape
//! first.
//!
//! ## Examples
//!
//! ```
//! use arbiter_policy::{Attributes, Condition, Engine};
//!
//! let cond: Condition = serde_json::from_value(serde_json::json!({
//!     "operator": "and",
//!     "conditions": [
//!         { "attribute": "user.department", "operator": "eq", "value": "finance" },
//!         { "attribute": "request.ip", "operator": "starts_with", "value": "10." },
//!         { "attribute": "user.groups", "operator": "intersects", "value": ["auditors", "admins"] }
//!     ]
//! }))
//! .unwrap();
//! cond.validate().unwrap();
//!
//! let attrs = Attributes::new()
//!     .with("user", serde_json::json!({
//!         "department": "finance",
//!         "groups": ["staff", "auditors"]
//!     }))
//!     .with("request", serde_json::json!({ "ip": "10.1.2.3" }));
//!
//! assert_eq!(Engine::new().eval(&cond, &attrs), Ok(true));
//! ```

pub mod coerce;
pub mod condition;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod operator;
pub mod policy;
pub mod resolver;
pub mod validate;


pub use arbiter_types::{TimeRange, Value, ValueKind};
pub use condition::Condition;
pub use engine::Engine;
pub use error::{ErrorKind, EvalError, Result};
pub use handlers::{Evaluate, OperatorHandler, Scope};
pub use operator::{Operator, OperatorKind, OperatorSpec, OperatorTag};
pub use policy::{Effect, Policy, PolicyError, PolicyStatus};
pub use resolver::{Attributes, Resolver};
pub use validate::{ValidationError, Validator};
