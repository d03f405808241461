//! Kani bounded model checking proofs for `TimeRange` invariants.
//!
//! - Construction never yields a range whose end precedes its start
//! - `contains` never reports the exclusive end as a member

use chrono::DateTime;

use crate::TimeRange;

#[kani::proof]
fn verify_constructed_ranges_are_ordered() {
    let start: i32 = kani::any();
    let end: i32 = kani::any();
    kani::assume(start > 0);

    let (Some(s), Some(e)) = (
        DateTime::from_timestamp(i64::from(start), 0),
        DateTime::from_timestamp(i64::from(end), 0),
    ) else {
        return;
    };

    if let Ok(range) = TimeRange::new(s, Some(e)) {
        assert!(range.start() <= range.end().unwrap());
        assert!(!range.contains(e));
    }
}
