//! rotation.rs: Multi-station rotation scheduling
//!
//! Groups move through a fixed list of stations in cyclic-shift order: group `g`
//! begins at station `g mod n` and visits every station once. Start and end times
//! are accumulated along each group's own path, so uneven station lengths leave
//! groups out of step with one another (and leave `-` cells in the matrix).
//!
//! Simultaneous stations only affect the builder's preview total; the time budget
//! always charges the sum of stations (see [`crate::duration::block_duration`]).

use std::collections::HashMap;

use tracing::{debug, info};

use crate::duration::{station_duration, sum_minutes};
use crate::error::PlannerError;
use crate::model::{Group, Minutes, RotationBlock, RotationDrill, RotationResult, RotationSlot, SessionBlock};
use crate::overrides::has_modified_members;

// ── Schedule ──────────────────────────────────────────────────────────────────

pub fn calculate_rotation(stations: &[RotationDrill], groups: &[Group]) -> RotationResult {
    if stations.is_empty() || groups.is_empty() {
        return RotationResult::default();
    }

    let time_per_group = sum_minutes(stations.iter().map(station_duration));
    let n = stations.len();
    let drill_count: usize = stations.iter().map(|s| s.drills.len()).sum();
    let mut schedule = Vec::with_capacity(groups.len() * drill_count);

    for (g, group) in groups.iter().enumerate() {
        let mut clock: Minutes = 0;
        for step in 0..n {
            let station_index = (step + g) % n;
            let station = &stations[station_index];
            for drill in &station.drills {
                schedule.push(RotationSlot {
                    group_id: group.id.clone(),
                    drill_id: drill.drill_id.clone(),
                    station_index,
                    start_time: clock,
                    end_time: clock.saturating_add(drill.duration),
                    coach_id: station.lead_coach().map(String::from),
                });
                clock = clock.saturating_add(drill.duration);
            }
        }
    }

    debug!("rotation: {n} stations x {} groups, {time_per_group}m per group", groups.len());

    // every group visits every station once, so all finish together
    RotationResult {
        total_session_time: time_per_group,
        time_per_group,
        rotation_schedule: schedule,
    }
}

/// What each group is doing at minute `t` (`start <= t < end`).
pub fn groups_at_time(schedule: &[RotationSlot], t: Minutes) -> HashMap<&str, &RotationSlot> {
    schedule
        .iter()
        .filter(|slot| slot.start_time <= t && t < slot.end_time)
        .map(|slot| (slot.group_id.as_str(), slot))
        .collect()
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Collects every structural problem as a warning string. Never short-circuits;
/// whether to block saving is the caller's call.
pub fn validate_rotation(stations: &[RotationDrill], groups: &[Group]) -> Vec<String> {
    let mut issues = Vec::new();

    if stations.is_empty() {
        issues.push("No stations assigned to rotation".to_string());
    }
    if groups.is_empty() {
        issues.push("No groups created for rotation".to_string());
    }
    if stations.len() < groups.len() {
        issues.push(format!(
            "Not enough stations ({}) for groups ({}). Add more stations or reduce groups.",
            stations.len(),
            groups.len()
        ));
    }

    let without_coach = stations.iter().filter(|s| s.lead_coach().is_none()).count();
    if without_coach > 0 {
        issues.push(format!("{without_coach} station(s) have no coach assigned"));
    }

    let without_drills = stations.iter().filter(|s| s.drills.is_empty()).count();
    if without_drills > 0 {
        issues.push(format!("{without_drills} station(s) have no drills"));
    }

    let zero_duration = stations
        .iter()
        .flat_map(|s| s.drills.iter())
        .filter(|d| d.duration == 0)
        .count();
    if zero_duration > 0 {
        issues.push(format!("{zero_duration} drill(s) have no duration set"));
    }

    issues
}

/// [`validate_rotation`] plus the simultaneous-mode check that every station
/// runs for the same length.
pub fn validate_rotation_block(block: &RotationBlock, groups: &[Group]) -> Vec<String> {
    let mut issues = validate_rotation(&block.rotation_drills, groups);
    if block.simultaneous_stations && !stations_balanced(&block.rotation_drills) {
        let lengths: Vec<String> = block
            .rotation_drills
            .iter()
            .map(|s| station_duration(s).to_string())
            .collect();
        issues.push(format!(
            "Station durations differ ({}m); sync to the longest station ({}m) so everyone finishes together",
            lengths.join("/"),
            longest_station(&block.rotation_drills)
        ));
    }
    issues
}

// ── Builder Totals & Auto-fix ─────────────────────────────────────────────────

/// Preview total shown while building: the longest station when stations run
/// simultaneously, else the sum of all stations.
pub fn builder_total(stations: &[RotationDrill], simultaneous: bool) -> Minutes {
    if simultaneous {
        longest_station(stations)
    } else {
        sum_minutes(stations.iter().map(station_duration))
    }
}

pub fn longest_station(stations: &[RotationDrill]) -> Minutes {
    stations.iter().map(station_duration).max().unwrap_or(0)
}

pub fn stations_balanced(stations: &[RotationDrill]) -> bool {
    let mut totals = stations.iter().map(station_duration);
    match totals.next() {
        Some(first) => totals.all(|t| t == first),
        None => true,
    }
}

/// Rescales every station to `target` minutes.
///
/// Single-drill stations take the target outright, floored at 1 minute. Multi-drill stations scale
/// each drill proportionally (rounded, at least 1 minute) and the last drill
/// absorbs the rounding remainder, also floored at 1. Stations with no timed
/// drills split the target evenly.
pub fn sync_station_durations(stations: &[RotationDrill], target: Minutes) -> Vec<RotationDrill> {
    stations
        .iter()
        .map(|station| {
            let current = station_duration(station);
            if current == target || station.drills.is_empty() {
                return station.clone();
            }

            let mut synced = station.clone();
            if synced.drills.len() == 1 {
                synced.drills[0].duration = target.max(1);
                return synced;
            }

            let weights: Vec<f64> = if current == 0 {
                vec![1.0; synced.drills.len()]
            } else {
                synced.drills.iter().map(|d| f64::from(d.duration)).collect()
            };
            let scale = f64::from(target) / weights.iter().sum::<f64>();
            let last = synced.drills.len() - 1;
            let mut remaining = i64::from(target);

            for (i, drill) in synced.drills.iter_mut().enumerate() {
                if i == last {
                    drill.duration = remaining.max(1) as Minutes;
                } else {
                    let scaled = ((weights[i] * scale).round() as Minutes).max(1);
                    remaining -= i64::from(scaled);
                    drill.duration = scaled;
                }
            }
            synced
        })
        .collect()
}

/// The one-click fix for unbalanced simultaneous stations.
pub fn sync_to_longest(stations: &[RotationDrill]) -> Vec<RotationDrill> {
    sync_station_durations(stations, longest_station(stations))
}

/// Station `i` gets group `i mod groups`.
pub fn auto_assign_groups(stations: &[RotationDrill], groups: &[Group]) -> Vec<RotationDrill> {
    if groups.is_empty() {
        return stations.to_vec();
    }
    stations
        .iter()
        .enumerate()
        .map(|(i, station)| RotationDrill {
            group_ids: vec![groups[i % groups.len()].id.clone()],
            ..station.clone()
        })
        .collect()
}

pub fn assign_all_groups(stations: &[RotationDrill], groups: &[Group]) -> Vec<RotationDrill> {
    let ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();
    stations
        .iter()
        .map(|station| RotationDrill { group_ids: ids.clone(), ..station.clone() })
        .collect()
}

// ── Matrix ────────────────────────────────────────────────────────────────────

/// Printable table: a `["Time", group names...]` header, then one row per
/// distinct station start time in station order. A cell names the drills of the
/// station a group begins at exactly that minute, or `-` when it begins none.
pub fn generate_rotation_matrix(
    stations: &[RotationDrill],
    groups: &[Group],
    drill_titles: &HashMap<String, String>,
) -> Vec<Vec<String>> {
    let result = calculate_rotation(stations, groups);

    let mut header = vec!["Time".to_string()];
    header.extend(groups.iter().map(|g| g.name.clone()));
    let mut matrix = vec![header];

    // (group, start minute) -> station index of the visit beginning then
    let mut visits: HashMap<(&str, Minutes), usize> = HashMap::new();
    let mut previous: Option<(&str, usize)> = None;
    for slot in &result.rotation_schedule {
        let key = (slot.group_id.as_str(), slot.station_index);
        if previous != Some(key) {
            visits.entry((key.0, slot.start_time)).or_insert(slot.station_index);
        }
        previous = Some(key);
    }

    let mut starts: Vec<Minutes> = Vec::with_capacity(stations.len());
    let mut clock: Minutes = 0;
    for station in stations {
        if starts.last() != Some(&clock) {
            starts.push(clock);
        }
        clock = clock.saturating_add(station_duration(station));
    }

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(clock);
        let mut row = vec![format!("{start}-{end}m")];
        for group in groups {
            let cell = match visits.get(&(group.id.as_str(), start)) {
                Some(&station_index) => station_titles(&stations[station_index], drill_titles),
                None => "-".to_string(),
            };
            row.push(cell);
        }
        matrix.push(row);
    }

    matrix
}

fn station_titles(station: &RotationDrill, drill_titles: &HashMap<String, String>) -> String {
    station
        .drills
        .iter()
        .map(|d| drill_titles.get(&d.drill_id).map(String::as_str).unwrap_or("Unknown"))
        .collect::<Vec<_>>()
        .join(" / ")
}

// ── Builder Draft ─────────────────────────────────────────────────────────────

/// An in-memory rotation being built or edited. Nothing is committed until
/// [`RotationDraft::finish`] turns it into a session block.
#[derive(Debug, Clone, Default)]
pub struct RotationDraft {
    pub name: String,
    pub stations: Vec<RotationDrill>,
    pub simultaneous: bool,
    /// Rotation-wide membership edits keyed by practice group id.
    pub rotation_groups: HashMap<String, Group>,
}

impl RotationDraft {
    /// Re-opens a saved block. Rotation-wide edits are recovered from the first
    /// station that carries an overlay.
    pub fn from_block(block: &RotationBlock) -> Self {
        let rotation_groups = block
            .rotation_drills
            .iter()
            .find(|s| !s.station_groups.is_empty())
            .map(|s| s.station_groups.clone())
            .unwrap_or_default();

        Self {
            name: block.notes.clone().unwrap_or_default(),
            stations: block.rotation_drills.clone(),
            simultaneous: block.simultaneous_stations,
            rotation_groups,
        }
    }

    /// Practice groups with rotation-wide edits applied, in practice order.
    pub fn effective_groups(&self, practice_groups: &[Group]) -> Vec<Group> {
        practice_groups
            .iter()
            .map(|g| self.rotation_groups.get(&g.id).unwrap_or(g).clone())
            .collect()
    }

    pub fn total(&self) -> Minutes {
        builder_total(&self.stations, self.simultaneous)
    }

    pub fn findings(&self, practice_groups: &[Group]) -> Vec<String> {
        let block = RotationBlock {
            rotation_drills: self.stations.clone(),
            simultaneous_stations: self.simultaneous,
            ..Default::default()
        };
        validate_rotation_block(&block, &self.effective_groups(practice_groups))
    }

    /// Commits the draft. Stations without explicit groups rotate every group;
    /// membership overlays are stored per station only when something changed.
    pub fn finish(
        self,
        id: impl Into<String>,
        order: u32,
        practice_groups: &[Group],
    ) -> Result<SessionBlock, PlannerError> {
        if self.stations.is_empty() {
            return Err(PlannerError::EmptyRotation);
        }

        let modified = has_modified_members(&self.rotation_groups, practice_groups);
        let all_ids: Vec<String> = self.effective_groups(practice_groups).into_iter().map(|g| g.id).collect();
        let rotation_groups = &self.rotation_groups;

        let stations: Vec<RotationDrill> = self
            .stations
            .into_iter()
            .map(|mut station| {
                if modified || !station.station_groups.is_empty() {
                    station.station_groups = station
                        .group_ids
                        .iter()
                        .filter_map(|gid| {
                            station
                                .station_groups
                                .get(gid)
                                .or_else(|| rotation_groups.get(gid))
                                .map(|g| (gid.clone(), g.clone()))
                        })
                        .collect();
                }
                if station.group_ids.is_empty() {
                    station.group_ids = all_ids.clone();
                }
                station
            })
            .collect();

        let name = if self.name.trim().is_empty() { "Rotation".to_string() } else { self.name };
        info!("Rotation '{name}' saved: {} stations", stations.len());

        Ok(SessionBlock::Rotation(RotationBlock {
            id: id.into(),
            order,
            rotation_drills: stations,
            simultaneous_stations: self.simultaneous,
            notes: Some(name),
        }))
    }
}
