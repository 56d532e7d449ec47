//! time_budget.rs: Used / remaining time for a whole practice
//!
//! Negative remaining time is a valid state and is reported as-is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::duration::{block_duration, sum_minutes};
use crate::model::{Minutes, SessionBlock, TimeEngineResult};
use crate::water_breaks::{water_breaks_needed, WATER_BREAK_DURATION};

/// Aggregates every block's duration plus, when enabled, the owed water breaks.
pub fn remaining_time(
    total_minutes: Minutes,
    blocks: &[SessionBlock],
    auto_water_breaks: bool,
) -> TimeEngineResult {
    let drill_minutes = sum_minutes(blocks.iter().map(block_duration));

    let water_breaks_inserted = if auto_water_breaks {
        water_breaks_needed(drill_minutes)
    } else {
        0
    };
    let used_minutes = drill_minutes.saturating_add(water_breaks_inserted.saturating_mul(WATER_BREAK_DURATION));
    let remaining_minutes = i64::from(total_minutes) - i64::from(used_minutes);

    debug!(
        "time budget: {} blocks, {drill_minutes}m drills, {water_breaks_inserted} breaks, {remaining_minutes}m left",
        blocks.len()
    );

    TimeEngineResult {
        total_minutes,
        used_minutes,
        remaining_minutes,
        is_over_limit: remaining_minutes < 0,
        water_breaks_inserted,
    }
}

impl TimeEngineResult {
    /// Share of the practice already planned, clamped to 0..=100 for a progress bar.
    pub fn used_percent(&self) -> f64 {
        if self.total_minutes == 0 {
            return if self.used_minutes > 0 { 100.0 } else { 0.0 };
        }
        let remaining_pct =
            (self.remaining_minutes as f64 / f64::from(self.total_minutes) * 100.0).clamp(0.0, 100.0);
        100.0 - remaining_pct
    }

    pub fn status(&self) -> TimeStatus {
        TimeStatus::classify(self.remaining_minutes, self.total_minutes)
    }

    /// `"45m left"` or `"10m over"`.
    pub fn remaining_label(&self) -> String {
        if self.is_over_limit {
            format!("{} over", format_time(self.remaining_minutes.abs()))
        } else {
            format!("{} left", format_time(self.remaining_minutes))
        }
    }
}

/// Severity band of the remaining time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeStatus {
    Over,
    /// 10 % or less left
    Critical,
    /// 25 % or less left
    Low,
    Healthy,
}

impl TimeStatus {
    pub fn classify(remaining_minutes: i64, total_minutes: Minutes) -> Self {
        if remaining_minutes < 0 {
            return TimeStatus::Over;
        }
        if total_minutes == 0 {
            return TimeStatus::Critical;
        }
        let pct = remaining_minutes as f64 / f64::from(total_minutes) * 100.0;
        if pct <= 10.0 {
            TimeStatus::Critical
        } else if pct <= 25.0 {
            TimeStatus::Low
        } else {
            TimeStatus::Healthy
        }
    }
}

/// `"1h 5m"`, `"45m"`, `"-10m"`. Hours are omitted when zero.
pub fn format_time(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.unsigned_abs();
    let hours = abs / 60;
    let mins = abs % 60;
    if hours > 0 {
        format!("{sign}{hours}h {mins}m")
    } else {
        format!("{sign}{mins}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RotationDrill, StationDrill};

    fn sample_blocks() -> Vec<SessionBlock> {
        vec![
            SessionBlock::single("warmup", "d1", 20),
            SessionBlock::rotation(
                "stations",
                vec![
                    RotationDrill::new("Tee", vec![StationDrill::new("d2", 15)]),
                    RotationDrill::new("Cage", vec![StationDrill::new("d3", 10), StationDrill::new("d4", 15)]),
                ],
            ),
        ]
    }

    #[test]
    fn aggregates_single_and_rotation_blocks() {
        let result = remaining_time(120, &sample_blocks(), false);
        assert_eq!(result.used_minutes, 60);
        assert_eq!(result.remaining_minutes, 60);
        assert!(!result.is_over_limit);
        assert_eq!(result.water_breaks_inserted, 0);
    }

    #[test]
    fn water_breaks_added_on_top_of_drill_time() {
        let blocks = vec![SessionBlock::single("a", "d1", 50), SessionBlock::single("b", "d2", 45)];
        let result = remaining_time(100, &blocks, true);
        // 95 minutes of drills -> 2 breaks, computed once from raw drill time
        assert_eq!(result.water_breaks_inserted, 2);
        assert_eq!(result.used_minutes, 105);
        assert_eq!(result.remaining_minutes, -5);
        assert!(result.is_over_limit);
        assert_eq!(result.status(), TimeStatus::Over);
        assert_eq!(result.remaining_label(), "5m over");
    }

    #[test]
    fn breaks_disabled_are_ignored() {
        let blocks = vec![SessionBlock::single("a", "d1", 95)];
        assert_eq!(remaining_time(90, &blocks, false).used_minutes, 95);
    }

    #[test]
    fn empty_plan_uses_nothing() {
        let result = remaining_time(90, &[], true);
        assert_eq!(result.used_minutes, 0);
        assert_eq!(result.remaining_minutes, 90);
        assert_eq!(result.used_percent(), 0.0);
        assert_eq!(result.status(), TimeStatus::Healthy);
    }

    #[test]
    fn used_percent_is_clamped() {
        let over = remaining_time(30, &[SessionBlock::single("a", "d", 40)], false);
        assert_eq!(over.used_percent(), 100.0);
        let half = remaining_time(60, &[SessionBlock::single("a", "d", 30)], false);
        assert!((half.used_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn oversized_durations_saturate_instead_of_panicking() {
        let blocks = vec![SessionBlock::single("a", "d1", Minutes::MAX), SessionBlock::single("b", "d2", 1)];
        let result = remaining_time(90, &blocks, false);
        assert_eq!(result.used_minutes, Minutes::MAX);
        assert_eq!(result.remaining_minutes, 90 - i64::from(Minutes::MAX));
        assert!(result.is_over_limit);

        let with_breaks = remaining_time(90, &[SessionBlock::single("a", "d1", Minutes::MAX - 3)], true);
        assert_eq!(with_breaks.used_minutes, Minutes::MAX);
        assert_eq!(with_breaks.water_breaks_inserted, (Minutes::MAX - 3) / 45);
        assert_eq!(with_breaks.status(), TimeStatus::Over);
    }

    #[test]
    fn status_bands() {
        assert_eq!(TimeStatus::classify(10, 100), TimeStatus::Critical);
        assert_eq!(TimeStatus::classify(25, 100), TimeStatus::Low);
        assert_eq!(TimeStatus::classify(26, 100), TimeStatus::Healthy);
        assert_eq!(TimeStatus::classify(-1, 100), TimeStatus::Over);
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_time(45), "45m");
        assert_eq!(format_time(65), "1h 5m");
        assert_eq!(format_time(120), "2h 0m");
        assert_eq!(format_time(-10), "-10m");
        assert_eq!(format_time(-75), "-1h 15m");
        assert_eq!(format_time(0), "0m");
    }
}
