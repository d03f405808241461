//! Policy records.
//!
//! A [`Policy`] attaches an [`Effect`], an optional validity period and a
//! root [`Condition`] to a resource. Deciding what a verdict means for a
//! request is left to the caller; this module only offers the lifecycle and
//! matching helpers such a caller needs.

use std::fmt::{self, Display};

use arbiter_types::{TimeRange, TimeRangeError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::condition::Condition;
use crate::engine::Engine;
use crate::resolver::Resolver;
use crate::validate::ValidationError;

/// Resource id that targets every instance of a resource.
pub const WILDCARD_RESOURCE_ID: &str = "*";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("policy resource is required")]
    MissingResource,

    #[error("policy period is required")]
    MissingPeriod,

    #[error("policy condition is invalid: {0}")]
    InvalidCondition(#[from] ValidationError),

    #[error("invalid policy period: {0}")]
    Period(#[from] TimeRangeError),

    #[error("extending the period by {by} overflows the supported time range")]
    PeriodOverflow { by: TimeDelta },
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

// ============================================================================
// Effect
// ============================================================================

/// What a matching policy does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Grant access.
    Allow,
    /// Deny access.
    #[default]
    Deny,
}

impl Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => f.write_str("allow"),
            Effect::Deny => f.write_str("deny"),
        }
    }
}

/// Where a policy sits relative to its period at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyStatus {
    Active,
    Expired,
    Scheduled,
}

impl Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyStatus::Active => f.write_str("active"),
            PolicyStatus::Expired => f.write_str("expired"),
            PolicyStatus::Scheduled => f.write_str("scheduled"),
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

/// An access policy for a resource, optionally narrowed to one resource id.
///
/// Time-dependent helpers take the instant explicitly (`*_at`); the
/// unsuffixed forms use the current wall clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    pub effect: Effect,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<TimeRange>,
}

impl Policy {
    /// Creates a policy for every instance of `resource`, with an empty
    /// condition and no period.
    pub fn new(id: impl Into<String>, resource: impl Into<String>, effect: Effect) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            resource_id: String::new(),
            effect,
            condition: Condition::default(),
            version: String::new(),
            dry_run: false,
            period: None,
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_period(mut self, period: TimeRange) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Checks that the policy names a resource, has a period, and carries a
    /// structurally valid condition.
    pub fn validate(&self) -> Result<()> {
        if self.resource.is_empty() {
            return Err(PolicyError::MissingResource);
        }
        if self.period.is_none() {
            return Err(PolicyError::MissingPeriod);
        }
        self.condition.validate()?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Period queries
    // ------------------------------------------------------------------------

    /// A policy without a period is always active.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.period.is_none_or(|period| period.contains(at))
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.end().is_some_and(|end| end < at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the period ends before `now + within`. A horizon past the
    /// representable range is never reached.
    pub fn will_expire_within(&self, within: TimeDelta, now: DateTime<Utc>) -> bool {
        let Some(horizon) = now.checked_add_signed(within) else {
            return false;
        };
        self.end().is_some_and(|end| end < horizon)
    }

    pub fn is_scheduled_at(&self, at: DateTime<Utc>) -> bool {
        self.period.is_some_and(|period| period.start() > at)
    }

    pub fn is_scheduled(&self) -> bool {
        self.is_scheduled_at(Utc::now())
    }

    pub fn status_at(&self, at: DateTime<Utc>) -> PolicyStatus {
        if self.is_expired_at(at) {
            PolicyStatus::Expired
        } else if self.is_scheduled_at(at) {
            PolicyStatus::Scheduled
        } else {
            PolicyStatus::Active
        }
    }

    /// Time left until the period ends. Zero for open-ended or expired
    /// periods.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> TimeDelta {
        self.end()
            .map_or(TimeDelta::zero(), |end| (end - now).max(TimeDelta::zero()))
    }

    fn end(&self) -> Option<DateTime<Utc>> {
        self.period.and_then(|period| period.end())
    }

    // ------------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------------

    pub fn matches(&self, resource: &str, resource_id: &str) -> bool {
        self.resource == resource && self.resource_id == resource_id
    }

    pub fn matches_resource(&self, resource: &str) -> bool {
        self.resource == resource
    }

    pub fn applies_to_at(&self, resource: &str, resource_id: &str, at: DateTime<Utc>) -> bool {
        self.is_active_at(at) && self.matches(resource, resource_id)
    }

    pub fn applies_to(&self, resource: &str, resource_id: &str) -> bool {
        self.applies_to_at(resource, resource_id, Utc::now())
    }

    pub fn is_allow(&self) -> bool {
        self.effect == Effect::Allow
    }

    pub fn is_deny(&self) -> bool {
        self.effect == Effect::Deny
    }

    /// A deny policy blocks when its condition matches; an allow policy
    /// blocks when it does not.
    pub fn should_block(&self, condition_matches: bool) -> bool {
        match self.effect {
            Effect::Deny => condition_matches,
            Effect::Allow => !condition_matches,
        }
    }

    pub fn is_same_resource(&self, other: &Policy) -> bool {
        self.resource == other.resource && self.resource_id == other.resource_id
    }

    /// Same target, opposite effects.
    pub fn has_conflict(&self, other: &Policy) -> bool {
        self.is_same_resource(other) && self.effect != other.effect
    }

    /// Conflict-resolution rank; higher wins.
    ///
    /// Deny outranks allow, enforced outranks dry-run, and a specific
    /// resource id outranks a resource-wide policy.
    pub fn priority(&self) -> u32 {
        let mut priority = 0;
        if self.is_deny() {
            priority += 100;
        }
        if !self.dry_run {
            priority += 50;
        }
        if !self.resource_id.is_empty() && self.resource_id != WILDCARD_RESOURCE_ID {
            priority += 25;
        }
        priority
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Moves the start of a scheduled policy to `now`. No-op otherwise.
    pub fn activate_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let Some(period) = self.period.filter(|p| p.start() > now) else {
            return Ok(());
        };
        self.period = Some(period.with_start(now)?);
        info!(policy = %self.id, start = %now, "Policy activated");
        Ok(())
    }

    pub fn activate(&mut self) -> Result<()> {
        self.activate_at(Utc::now())
    }

    /// Ends the period at `now`. No-op if it already ended.
    pub fn deactivate_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let period = self.period.ok_or(PolicyError::MissingPeriod)?;
        if period.end().is_some_and(|end| end < now) {
            return Ok(());
        }
        self.period = Some(period.with_end(Some(now))?);
        warn!(policy = %self.id, end = %now, "Policy deactivated");
        Ok(())
    }

    pub fn deactivate(&mut self) -> Result<()> {
        self.deactivate_at(Utc::now())
    }

    /// Pushes the end back by `by`. An open-ended period gets an end of
    /// `now + by`.
    pub fn extend_by_at(&mut self, by: TimeDelta, now: DateTime<Utc>) -> Result<()> {
        let period = self.period.ok_or(PolicyError::MissingPeriod)?;
        let end = period
            .end()
            .unwrap_or(now)
            .checked_add_signed(by)
            .ok_or(PolicyError::PeriodOverflow { by })?;
        self.period = Some(period.with_end(Some(end))?);
        info!(policy = %self.id, end = %end, "Policy extended");
        Ok(())
    }

    pub fn extend_by(&mut self, by: TimeDelta) -> Result<()> {
        self.extend_by_at(by, Utc::now())
    }

    pub fn set_end(&mut self, end: DateTime<Utc>) -> Result<()> {
        let period = self.period.ok_or(PolicyError::MissingPeriod)?;
        self.period = Some(period.with_end(Some(end))?);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Evaluates the root condition. Dry-run verdicts are logged and still
    /// returned; acting on them is up to the caller.
    pub fn evaluate(&self, engine: &Engine, resolver: &dyn Resolver) -> crate::Result<bool> {
        let matched = engine.eval(&self.condition, resolver)?;
        if self.dry_run {
            info!(
                policy = %self.id,
                resource = %self.resource,
                effect = %self.effect,
                matched,
                would_block = self.should_block(matched),
                "Dry-run policy evaluated"
            );
        }
        Ok(matched)
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, at: DateTime<Utc>) -> fmt::Result {
        write!(
            f,
            "Policy[{}] {}/{}: {} ({})",
            self.id,
            self.resource,
            self.resource_id,
            self.effect,
            self.status_at(at)
        )?;
        if self.dry_run {
            f.write_str(" [DRY-RUN]")?;
        }
        Ok(())
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, Utc::now())
    }
}
