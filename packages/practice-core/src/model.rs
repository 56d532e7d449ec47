//! model.rs: Practice data model
//!
//! Field names serialize in camelCase so the same documents round-trip through
//! the backend snapshot, the CLI plan file and the web client.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::group_book::GroupBook;

/// Whole minutes. Every duration in a plan is an integer minute count.
pub type Minutes = u32;

/// Notes text that marks a single block as a rest interval.
pub const WATER_BREAK_NOTE: &str = "Water Break";

// ── Roster ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[default]
    Active,
    Injured,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub jersey_number: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub status: PlayerStatus,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            jersey_number: String::new(),
            position: String::new(),
            status: PlayerStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// Which partition a group belongs to. Groups and partners are tracked
/// independently: a player may sit in one group and one partner unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    #[default]
    Group,
    Partner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub player_ids: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: GroupKind,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            player_ids: Vec::new(),
            kind,
        }
    }

    pub fn len(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_ids.is_empty()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }
}

// ── Catalogs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DrillCategory {
    #[default]
    Warmup,
    Hitting,
    Fielding,
    Pitching,
    Catching,
    Iq,
    Games,
}

impl DrillCategory {
    pub const ALL: [DrillCategory; 7] = [
        DrillCategory::Warmup,
        DrillCategory::Hitting,
        DrillCategory::Fielding,
        DrillCategory::Pitching,
        DrillCategory::Catching,
        DrillCategory::Iq,
        DrillCategory::Games,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: DrillCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_duration: Minutes,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub equipment_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// ── Session Blocks ────────────────────────────────────────────────────────────

/// One timed drill inside a station. Stations run their drills back to back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationDrill {
    pub drill_id: String,
    #[serde(default)]
    pub duration: Minutes,
}

impl StationDrill {
    pub fn new(drill_id: impl Into<String>, duration: Minutes) -> Self {
        Self { drill_id: drill_id.into(), duration }
    }
}

/// A rotation station: one or more drills, the coaches running it, the groups
/// sent to it and an optional per-station membership overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RotationDrill {
    #[serde(default)]
    pub station_name: String,
    #[serde(default)]
    pub drills: Vec<StationDrill>,
    #[serde(default)]
    pub coach_ids: Vec<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub equipment_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub station_groups: HashMap<String, Group>,
}

impl RotationDrill {
    pub fn new(station_name: impl Into<String>, drills: Vec<StationDrill>) -> Self {
        Self {
            station_name: station_name.into(),
            drills,
            ..Default::default()
        }
    }

    pub fn with_coach(mut self, coach_id: impl Into<String>) -> Self {
        self.coach_ids.push(coach_id.into());
        self
    }

    /// The coach shown on schedule slots: the first one assigned.
    pub fn lead_coach(&self) -> Option<&str> {
        self.coach_ids.iter().map(String::as_str).find(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SingleDrillBlock {
    pub id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drill_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Minutes>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub coach_ids: Vec<String>,
    #[serde(default)]
    pub equipment_ids: Vec<String>,
    /// Drill-local membership changes keyed by practice group id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub drill_groups: HashMap<String, Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RotationBlock {
    pub id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub rotation_drills: Vec<RotationDrill>,
    #[serde(default)]
    pub simultaneous_stations: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The atomic schedulable unit of a practice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionBlock {
    Single(SingleDrillBlock),
    Rotation(RotationBlock),
}

impl SessionBlock {
    pub fn single(id: impl Into<String>, drill_id: impl Into<String>, duration: Minutes) -> Self {
        SessionBlock::Single(SingleDrillBlock {
            id: id.into(),
            drill_id: Some(drill_id.into()),
            duration: Some(duration),
            ..Default::default()
        })
    }

    pub fn rotation(id: impl Into<String>, stations: Vec<RotationDrill>) -> Self {
        SessionBlock::Rotation(RotationBlock {
            id: id.into(),
            rotation_drills: stations,
            ..Default::default()
        })
    }

    /// A 5-minute rest block as a coach would insert it by hand.
    pub fn water_break(id: impl Into<String>, order: u32) -> Self {
        SessionBlock::Single(SingleDrillBlock {
            id: id.into(),
            order,
            duration: Some(crate::water_breaks::WATER_BREAK_DURATION),
            notes: Some(WATER_BREAK_NOTE.to_string()),
            ..Default::default()
        })
    }

    pub fn id(&self) -> &str {
        match self {
            SessionBlock::Single(b) => &b.id,
            SessionBlock::Rotation(b) => &b.id,
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            SessionBlock::Single(b) => b.order,
            SessionBlock::Rotation(b) => b.order,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            SessionBlock::Single(b) => b.notes.as_deref(),
            SessionBlock::Rotation(b) => b.notes.as_deref(),
        }
    }

    pub fn is_water_break(&self) -> bool {
        matches!(self, SessionBlock::Single(b) if b.notes.as_deref() == Some(WATER_BREAK_NOTE))
    }

    pub fn is_rotation(&self) -> bool {
        matches!(self, SessionBlock::Rotation(_))
    }

    fn set_order(&mut self, order: u32) {
        match self {
            SessionBlock::Single(b) => b.order = order,
            SessionBlock::Rotation(b) => b.order = order,
        }
    }
}

/// Rewrites every block's `order` to its position in the list.
pub fn renumber_blocks(mut blocks: Vec<SessionBlock>) -> Vec<SessionBlock> {
    for (i, block) in blocks.iter_mut().enumerate() {
        block.set_order(i as u32);
    }
    blocks
}

// ── Practice Aggregate ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PracticeStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Practice {
    pub id: String,
    pub date: NaiveDate,
    pub total_minutes: Minutes,
    #[serde(default)]
    pub attendance: HashMap<String, bool>,
    #[serde(default)]
    pub groups: GroupBook,
    #[serde(default)]
    pub session_blocks: Vec<SessionBlock>,
    #[serde(default)]
    pub status: PracticeStatus,
    #[serde(default)]
    pub post_practice_notes: String,
}

impl Practice {
    /// Number of rotation blocks, the drill count used for group-count suggestions.
    pub fn rotation_block_count(&self) -> usize {
        self.session_blocks.iter().filter(|b| b.is_rotation()).count()
    }
}

// ── Derived Results ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RotationSlot {
    pub group_id: String,
    pub drill_id: String,
    /// Index of the station this drill belongs to.
    pub station_index: usize,
    pub start_time: Minutes,
    pub end_time: Minutes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RotationResult {
    pub total_session_time: Minutes,
    pub time_per_group: Minutes,
    pub rotation_schedule: Vec<RotationSlot>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEngineResult {
    pub total_minutes: Minutes,
    pub used_minutes: Minutes,
    /// Negative when the plan runs over.
    pub remaining_minutes: i64,
    pub is_over_limit: bool,
    pub water_breaks_inserted: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_block_without_stations_deserializes() {
        let block: SessionBlock =
            serde_json::from_str(r#"{ "type": "rotation", "id": "b1" }"#).unwrap();
        match block {
            SessionBlock::Rotation(r) => {
                assert!(r.rotation_drills.is_empty());
                assert!(!r.simultaneous_stations);
            }
            other => panic!("expected rotation block, got {other:?}"),
        }
    }

    #[test]
    fn group_kind_defaults_to_group() {
        let g: Group = serde_json::from_str(r#"{ "id": "g1", "name": "Group A" }"#).unwrap();
        assert_eq!(g.kind, GroupKind::Group);
        assert!(g.is_empty());

        let p: Group = serde_json::from_str(
            r#"{ "id": "p1", "name": "Partners 1", "type": "partner", "playerIds": ["a", "b"] }"#,
        )
        .unwrap();
        assert_eq!(p.kind, GroupKind::Partner);
        assert!(p.contains("b"));
    }

    #[test]
    fn water_break_block_is_recognised() {
        let block = SessionBlock::water_break("wb", 3);
        assert!(block.is_water_break());
        assert_eq!(block.order(), 3);
        assert!(!SessionBlock::single("s", "d1", 5).is_water_break());
    }

    #[test]
    fn renumber_rewrites_order() {
        let blocks = vec![
            SessionBlock::single("a", "d1", 10),
            SessionBlock::water_break("wb", 7),
            SessionBlock::rotation("r", vec![]),
        ];
        let blocks = renumber_blocks(blocks);
        let orders: Vec<u32> = blocks.iter().map(SessionBlock::order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn lead_coach_skips_blank_ids() {
        let station = RotationDrill::new("Cage", vec![]).with_coach("").with_coach("c2");
        assert_eq!(station.lead_coach(), Some("c2"));
        assert_eq!(RotationDrill::default().lead_coach(), None);
    }
}
