//! Half-open validity intervals.
//!
//! A [`TimeRange`] is `[start, end)`: the start instant is included, the end
//! instant is excluded, and a missing end means the range never closes.
//! Every constructor (including deserialization) enforces the invariants, so
//! a `TimeRange` value is always well-formed.

use std::fmt::{self, Display};

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds from the Unix epoch to 0001-01-01T00:00:00Z, the unset start.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

fn is_zero_time(t: DateTime<Utc>) -> bool {
    t.timestamp() == ZERO_TIME_SECS && t.timestamp_subsec_nanos() == 0
}

/// Error type for time range construction and manipulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    /// The start instant is the zero time.
    #[error("start time cannot be the zero time (0001-01-01T00:00:00Z)")]
    ZeroStart,

    /// The end instant precedes the start instant.
    #[error("end time {end} cannot be before start {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A split point outside the range (or equal to its start).
    #[error("split time {at} outside range")]
    SplitOutside { at: DateTime<Utc> },
}

/// Result type for time range operations.
pub type Result<T> = std::result::Result<T, TimeRangeError>;

/// A half-open interval `[start, end)`, open-ended when `end` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeRangeRepr", into = "TimeRangeRepr")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

/// Wire shape: `{ "start": <timestamp>, "end": <timestamp|null> }`.
#[derive(Serialize, Deserialize)]
struct TimeRangeRepr {
    start: DateTime<Utc>,
    #[serde(default)]
    end: Option<DateTime<Utc>>,
}

impl TryFrom<TimeRangeRepr> for TimeRange {
    type Error = TimeRangeError;

    fn try_from(repr: TimeRangeRepr) -> Result<Self> {
        TimeRange::new(repr.start, repr.end)
    }
}

impl From<TimeRange> for TimeRangeRepr {
    fn from(range: TimeRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl TimeRange {
    /// Creates a range, rejecting a zero start and an end before the start.
    ///
    /// The zero time is 0001-01-01T00:00:00Z, the conventional unset
    /// instant. The Unix epoch is a valid start.
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if is_zero_time(start) {
            return Err(TimeRangeError::ZeroStart);
        }

        if let Some(end) = end {
            if end < start {
                return Err(TimeRangeError::EndBeforeStart { start, end });
            }
        }

        Ok(Self { start, end })
    }

    /// Creates an open-ended range starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Result<Self> {
        Self::new(start, None)
    }

    /// Inclusive start of the range.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end of the range, `None` when open-ended.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }

    /// True when `start == end`; such a range contains no instant.
    pub fn is_empty(&self) -> bool {
        self.end == Some(self.start)
    }

    /// Length of the range. Open-ended ranges report zero.
    pub fn duration(&self) -> TimeDelta {
        self.end.map_or(TimeDelta::zero(), |end| end - self.start)
    }

    /// Whether `t` lies in `[start, end)`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        if t < self.start {
            return false;
        }
        self.end.is_none_or(|end| t < end)
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.intersect(other).is_some()
    }

    /// Returns the intersection of two ranges, or `None` when they are disjoint
    /// (touching ranges do not intersect).
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);

        let end = match (self.end, other.end) {
            (None, None) => None,
            (None, Some(e)) | (Some(e), None) => Some(e),
            (Some(a), Some(b)) => Some(a.min(b)),
        };

        if let Some(end) = end {
            if start >= end {
                return None;
            }
        }

        Some(TimeRange { start, end })
    }

    /// Restricts this range to `bounds`.
    pub fn clamp(&self, bounds: &TimeRange) -> Option<TimeRange> {
        self.intersect(bounds)
    }

    /// Splits the range at `at`, returning `[start, at)` and `[at, end)`.
    pub fn split(&self, at: DateTime<Utc>) -> Result<(TimeRange, TimeRange)> {
        if !self.contains(at) || at == self.start {
            return Err(TimeRangeError::SplitOutside { at });
        }

        let left = TimeRange {
            start: self.start,
            end: Some(at),
        };
        let right = TimeRange {
            start: at,
            end: self.end,
        };
        Ok((left, right))
    }

    /// Returns a copy with a different end.
    pub fn with_end(&self, end: Option<DateTime<Utc>>) -> Result<TimeRange> {
        TimeRange::new(self.start, end)
    }

    /// Returns a copy with a different start.
    pub fn with_start(&self, start: DateTime<Utc>) -> Result<TimeRange> {
        TimeRange::new(start, self.end)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        match self.end {
            Some(end) => write!(
                f,
                "[{start}, {})",
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => write!(f, "[{start}, ∞)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap()
    }

    fn range(start: u32, end: Option<u32>) -> TimeRange {
        TimeRange::new(at(start), end.map(at)).expect("valid range")
    }

    #[test]
    fn rejects_zero_start() {
        let zero = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(TimeRange::new(zero, None), Err(TimeRangeError::ZeroStart));

        let decoded: std::result::Result<TimeRange, _> =
            serde_json::from_str(r#"{"start":"0001-01-01T00:00:00Z"}"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn accepts_unix_epoch_start() {
        let epoch = DateTime::<Utc>::default();
        assert_eq!(TimeRange::new(epoch, None).map(|r| r.start()), Ok(epoch));

        let decoded: TimeRange =
            serde_json::from_str(r#"{"start":"1970-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(decoded.start(), epoch);
    }

    #[test]
    fn rejects_end_before_start() {
        let err = TimeRange::new(at(5), Some(at(4))).unwrap_err();
        assert!(matches!(err, TimeRangeError::EndBeforeStart { .. }));
    }

    #[test]
    fn contains_is_half_open() {
        let r = range(9, Some(17));
        assert!(r.contains(at(9)));
        assert!(r.contains(at(16)));
        assert!(!r.contains(at(17)));
        assert!(!r.contains(at(8)));
    }

    #[test]
    fn open_ended_contains_everything_after_start() {
        let r = range(9, None);
        assert!(r.is_open_ended());
        assert!(r.contains(at(23)));
        assert_eq!(r.duration(), TimeDelta::zero());
    }

    #[test]
    fn empty_range_contains_nothing() {
        let r = range(9, Some(9));
        assert!(r.is_empty());
        assert!(!r.contains(at(9)));
    }

    #[test]
    fn intersect_overlapping_ranges() {
        let a = range(8, Some(12));
        let b = range(10, None);
        assert_eq!(a.intersect(&b), Some(range(10, Some(12))));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let a = range(8, Some(10));
        let b = range(10, Some(12));
        assert_eq!(a.intersect(&b), None);
        assert_eq!(a.clamp(&b), None);
    }

    #[test]
    fn split_produces_adjacent_halves() {
        let (left, right) = range(8, Some(12)).split(at(10)).expect("split inside");
        assert_eq!(left, range(8, Some(10)));
        assert_eq!(right, range(10, Some(12)));
    }

    #[test]
    fn split_at_start_or_outside_fails() {
        let r = range(8, Some(12));
        assert!(r.split(at(8)).is_err());
        assert!(r.split(at(12)).is_err());
    }

    #[test]
    fn with_end_revalidates() {
        let r = range(8, None);
        assert!(r.with_end(Some(at(7))).is_err());
        assert_eq!(r.with_end(Some(at(9))).unwrap().duration(), TimeDelta::hours(1));
    }

    #[test]
    fn json_shape() {
        let r = range(8, None);
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "start": "2024-03-01T08:00:00Z", "end": null })
        );

        let decoded: TimeRange = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, r);
    }

    #[test]
    fn deserialize_enforces_invariants() {
        let bad = serde_json::json!({ "start": "2024-03-01T08:00:00Z", "end": "2024-03-01T07:00:00Z" });
        assert!(serde_json::from_value::<TimeRange>(bad).is_err());

        let missing_end = serde_json::json!({ "start": "2024-03-01T08:00:00Z" });
        let decoded: TimeRange = serde_json::from_value(missing_end).unwrap();
        assert!(decoded.is_open_ended());
    }

    proptest! {
        #[test]
        fn contains_agrees_with_bounds(
            start in 1i64..1_000_000,
            len in 0i64..1_000_000,
            probe in 0i64..3_000_000,
        ) {
            let s = DateTime::from_timestamp(start, 0).unwrap();
            let e = DateTime::from_timestamp(start + len, 0).unwrap();
            let p = DateTime::from_timestamp(probe, 0).unwrap();
            let r = TimeRange::new(s, Some(e)).unwrap();
            prop_assert_eq!(r.contains(p), s <= p && p < e);
        }
    }
}
