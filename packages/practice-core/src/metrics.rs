//! metrics.rs: Attendance and drill-time summaries over saved practices
//!
//! Both summaries look at the practices dated on or after the start of a
//! trailing window. Practices later than the reference day still count.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Drill, DrillCategory, Minutes, Player, Practice, SessionBlock};

// ── Window ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricsRange {
    Week,
    #[default]
    Month,
    /// Four months back.
    Season,
}

impl MetricsRange {
    /// First day inside the window ending at `today`. Month steps clamp to the
    /// last day of a shorter month.
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            MetricsRange::Week => today.checked_sub_days(Days::new(7)),
            MetricsRange::Month => today.checked_sub_months(Months::new(1)),
            MetricsRange::Season => today.checked_sub_months(Months::new(4)),
        };
        start.unwrap_or(NaiveDate::MIN)
    }

    pub fn select<'a>(self, practices: impl IntoIterator<Item = &'a Practice>, today: NaiveDate) -> Vec<&'a Practice> {
        let start = self.start(today);
        practices.into_iter().filter(|p| p.date >= start).collect()
    }
}

fn find_drill<'a>(drills: &'a [Drill], id: &str) -> Option<&'a Drill> {
    drills.iter().find(|d| d.id == id)
}

fn rounded_percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

// ── Attendance ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRate {
    pub player_id: String,
    pub name: String,
    pub present: u32,
    /// Practices in the window; every practice counts for every roster player.
    pub total: u32,
    pub rate_percent: u32,
}

/// One entry per roster player, highest rate first. Ties keep roster order.
pub fn attendance_rates(players: &[Player], practices: &[&Practice]) -> Vec<AttendanceRate> {
    let total = u32::try_from(practices.len()).unwrap_or(u32::MAX);
    let mut rates: Vec<AttendanceRate> = players
        .iter()
        .map(|player| {
            let present = practices
                .iter()
                .filter(|p| p.attendance.get(&player.id).copied().unwrap_or(false))
                .count();
            let present = u32::try_from(present).unwrap_or(u32::MAX);
            AttendanceRate {
                player_id: player.id.clone(),
                name: player.name.clone(),
                present,
                total,
                rate_percent: rounded_percent(u64::from(present), u64::from(total)),
            }
        })
        .collect();

    rates.sort_by(|a, b| b.rate_percent.cmp(&a.rate_percent));
    rates
}

// ── Drill Categories ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMinutes {
    pub category: DrillCategory,
    pub minutes: Minutes,
    pub percent: u32,
}

/// Drill minutes per category, most minutes first; categories with no time are
/// left out.
///
/// A single block counts its own duration, or the drill's base duration when it
/// has none (or 0). Rotation blocks count each station drill's duration. Blocks
/// without a drill, and drills missing from the catalog, count nowhere.
pub fn category_minutes(practices: &[&Practice], drills: &[Drill]) -> Vec<CategoryMinutes> {
    let mut totals: Vec<(DrillCategory, Minutes)> = DrillCategory::ALL.iter().map(|&c| (c, 0)).collect();
    let mut add = |category: DrillCategory, minutes: Minutes| {
        if let Some(slot) = totals.iter_mut().find(|(c, _)| *c == category) {
            slot.1 = slot.1.saturating_add(minutes);
        }
    };

    for practice in practices {
        for block in &practice.session_blocks {
            match block {
                SessionBlock::Single(single) => {
                    let Some(drill) = single.drill_id.as_deref().and_then(|id| find_drill(drills, id)) else {
                        continue;
                    };
                    let minutes = single.duration.filter(|&d| d > 0).unwrap_or(drill.base_duration);
                    add(drill.category, minutes);
                }
                SessionBlock::Rotation(rotation) => {
                    for station_drill in rotation.rotation_drills.iter().flat_map(|s| s.drills.iter()) {
                        if let Some(drill) = find_drill(drills, &station_drill.drill_id) {
                            add(drill.category, station_drill.duration);
                        }
                    }
                }
            }
        }
    }

    let grand_total: u64 = totals.iter().map(|&(_, m)| u64::from(m)).sum();
    debug!("category minutes: {} practices, {grand_total}m total", practices.len());

    let mut out: Vec<CategoryMinutes> = totals
        .into_iter()
        .filter(|&(_, minutes)| minutes > 0)
        .map(|(category, minutes)| CategoryMinutes {
            category,
            minutes,
            percent: rounded_percent(u64::from(minutes), grand_total),
        })
        .collect();
    out.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    out
}
