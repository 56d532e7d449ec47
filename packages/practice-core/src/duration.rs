//! duration.rs: Time cost of a single session block
//!
//! A rotation block costs the time one group needs to visit every station once:
//! the sum of station totals. Simultaneous stations are a builder preview concept
//! (see [`crate::rotation::builder_total`]) and are not applied here.

use crate::model::{Minutes, RotationDrill, SessionBlock};

/// Adds minute counts, pinning at `Minutes::MAX` instead of wrapping.
pub fn sum_minutes<I: IntoIterator<Item = Minutes>>(minutes: I) -> Minutes {
    minutes.into_iter().fold(0, Minutes::saturating_add)
}

/// Total minutes of one station: its drills run back to back.
pub fn station_duration(station: &RotationDrill) -> Minutes {
    sum_minutes(station.drills.iter().map(|d| d.duration))
}

/// Minutes consumed by one block. Missing durations and empty station lists count as 0.
pub fn block_duration(block: &SessionBlock) -> Minutes {
    match block {
        SessionBlock::Single(single) => single.duration.unwrap_or(0),
        SessionBlock::Rotation(rotation) => sum_minutes(rotation.rotation_drills.iter().map(station_duration)),
    }
}
