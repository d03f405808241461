//! # arbiter-types: Core value types for `Arbiter`
//!
//! This crate contains the types shared across the Arbiter workspace:
//! - Dynamic attribute values ([`Value`], [`ValueKind`])
//! - Validity periods ([`TimeRange`], [`TimeRangeError`])
//!
//! Attribute values arrive loosely typed (decoded JSON, application records,
//! timestamps). [`Value`] is the tagged union every evaluator in the
//! workspace operates on.
//!
//! ```
//! use arbiter_types::Value;
//!
//! let value = Value::from(serde_json::json!({ "user": { "roles": ["admin"] } }));
//! assert_eq!(value.get("user").and_then(|u| u.get("roles")), Some(&Value::from(["admin"])));
//! ```

pub mod time_range;
pub mod value;

#[cfg(kani)]
mod kani_proofs;

pub use time_range::{TimeRange, TimeRangeError};
pub use value::{Value, ValueKind};
