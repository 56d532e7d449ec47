//! plan.rs: TOML practice plan file
//!
//! A plan is the offline stand-in for the web builder: roster with attendance,
//! drill and coach catalogs, and an ordered list of blocks. Rotation blocks go
//! through the same draft/commit path the backend uses.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use practice_core::rotation::RotationDraft;
use practice_core::{
    renumber_blocks, Coach, Drill, Group, GroupBook, Minutes, Player, Practice, PracticeStatus, RotationDrill,
    SessionBlock, SingleDrillBlock,
};

// ── File shape ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFile {
    pub practice: PracticeHeader,
    #[serde(default)]
    pub players: Vec<RosterEntry>,
    #[serde(default)]
    pub drills: Vec<Drill>,
    #[serde(default)]
    pub coaches: Vec<Coach>,
    #[serde(default)]
    pub blocks: Vec<PlanBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeHeader {
    #[serde(default = "default_practice_id")]
    pub id: String,
    pub date: NaiveDate,
    pub total_minutes: Minutes,
    /// Groups to create; falls back to the suggested count.
    #[serde(default)]
    pub groups: Option<usize>,
}

fn default_practice_id() -> String {
    "practice".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(flatten)]
    pub player: Player,
    #[serde(default = "present_by_default")]
    pub present: bool,
}

fn present_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlanBlock {
    #[serde(rename_all = "camelCase")]
    Single {
        drill_id: Option<String>,
        duration: Option<Minutes>,
        #[serde(default)]
        coach_ids: Vec<String>,
        notes: Option<String>,
    },
    #[serde(rename = "water")]
    WaterBreak,
    #[serde(rename_all = "camelCase")]
    Rotation {
        #[serde(default)]
        name: String,
        #[serde(default)]
        simultaneous_stations: bool,
        #[serde(default)]
        stations: Vec<RotationDrill>,
    },
}

// ── Loading ───────────────────────────────────────────────────────────────────

pub fn parse(raw: &str) -> Result<PlanFile> {
    let plan: PlanFile = toml::from_str(raw).context("invalid plan file")?;
    plan.check_references()?;
    Ok(plan)
}

impl PlanFile {
    /// Rejects blocks pointing at drills the catalog does not define.
    fn check_references(&self) -> Result<()> {
        let known: Vec<&str> = self.drills.iter().map(|d| d.id.as_str()).collect();
        for (i, block) in self.blocks.iter().enumerate() {
            let ids: Vec<&str> = match block {
                PlanBlock::Single { drill_id, .. } => drill_id.iter().map(String::as_str).collect(),
                PlanBlock::WaterBreak => Vec::new(),
                PlanBlock::Rotation { stations, .. } => stations
                    .iter()
                    .flat_map(|s| s.drills.iter().map(|d| d.drill_id.as_str()))
                    .collect(),
            };
            if let Some(missing) = ids.into_iter().find(|id| !known.contains(id)) {
                bail!("block {} references unknown drill '{missing}'", i + 1);
            }
        }
        Ok(())
    }

    pub fn roster(&self) -> Vec<Player> {
        self.players.iter().map(|e| e.player.clone()).collect()
    }

    pub fn attendance(&self) -> HashMap<String, bool> {
        self.players.iter().map(|e| (e.player.id.clone(), e.present)).collect()
    }

    pub fn drill_titles(&self) -> HashMap<String, String> {
        self.drills.iter().map(|d| (d.id.clone(), d.title.clone())).collect()
    }

    /// Builds the practice around already-created groups. Rotation stations
    /// without explicit groups rotate every group.
    pub fn into_practice(self, groups: Vec<Group>) -> Result<Practice> {
        let attendance = self.attendance();
        let mut blocks = Vec::with_capacity(self.blocks.len());

        for (i, block) in self.blocks.into_iter().enumerate() {
            let id = format!("block-{}", i + 1);
            let order = i as u32;
            let block = match block {
                PlanBlock::Single { drill_id, duration, coach_ids, notes } => {
                    SessionBlock::Single(SingleDrillBlock {
                        id,
                        order,
                        drill_id,
                        duration,
                        coach_ids,
                        notes,
                        ..Default::default()
                    })
                }
                PlanBlock::WaterBreak => SessionBlock::water_break(id, order),
                PlanBlock::Rotation { name, simultaneous_stations, stations } => RotationDraft {
                    name,
                    stations,
                    simultaneous: simultaneous_stations,
                    rotation_groups: HashMap::new(),
                }
                .finish(id, order, &groups)
                .with_context(|| format!("block {}", i + 1))?,
            };
            blocks.push(block);
        }

        Ok(Practice {
            id: self.practice.id,
            date: self.practice.date,
            total_minutes: self.practice.total_minutes,
            attendance,
            groups: GroupBook::new(groups),
            session_blocks: renumber_blocks(blocks),
            status: PracticeStatus::Draft,
            post_practice_notes: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../plan.toml");

    #[test]
    fn sample_plan_parses() {
        let plan = parse(SAMPLE).unwrap();
        assert_eq!(plan.practice.total_minutes, 90);
        assert!(plan.players.len() >= 10);
        assert!(plan.players.iter().any(|e| !e.present));
        assert!(plan.blocks.iter().any(|b| matches!(b, PlanBlock::Rotation { .. })));
    }

    #[test]
    fn unknown_drill_is_rejected() {
        let raw = r#"
            [practice]
            date = "2026-04-14"
            totalMinutes = 60

            [[blocks]]
            type = "single"
            drillId = "nope"
            duration = 10
        "#;
        let err = parse(raw).unwrap_err();
        assert!(err.to_string().contains("unknown drill 'nope'"));
    }

    #[test]
    fn rotation_without_stations_fails_to_build() {
        let raw = r#"
            [practice]
            date = "2026-04-14"
            totalMinutes = 60

            [[blocks]]
            type = "rotation"
            name = "Empty"
        "#;
        let plan = parse(raw).unwrap();
        assert!(plan.into_practice(Vec::new()).is_err());
    }

    #[test]
    fn blocks_are_numbered_and_rotations_get_every_group() {
        let plan = parse(SAMPLE).unwrap();
        let groups = vec![
            Group::new("g1", "Group A", practice_core::GroupKind::Group),
            Group::new("g2", "Group B", practice_core::GroupKind::Group),
        ];
        let practice = plan.into_practice(groups).unwrap();

        for (i, block) in practice.session_blocks.iter().enumerate() {
            assert_eq!(block.order(), i as u32);
            assert_eq!(block.id(), format!("block-{}", i + 1));
        }
        let rotation = practice
            .session_blocks
            .iter()
            .find_map(|b| match b {
                SessionBlock::Rotation(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert!(rotation.rotation_drills.iter().all(|s| s.group_ids == vec!["g1", "g2"]));
        assert!(practice.session_blocks.iter().any(SessionBlock::is_water_break));
    }
}
