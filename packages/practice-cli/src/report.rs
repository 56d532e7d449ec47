//! report.rs: Computed plan summary, printable or as JSON

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use practice_core::rotation::builder_total;
use practice_core::{
    block_duration, format_time, generate_rotation_matrix, group_stats, remaining_time, validate_rotation_block,
    water_break_positions, Group, GroupKind, GroupStats, Minutes, Player, Practice, SessionBlock, TimeEngineResult,
    TimeStatus,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub practice_id: String,
    pub date: String,
    pub time: TimeEngineResult,
    pub status: TimeStatus,
    pub used_percent: f64,
    pub water_break_after: Vec<usize>,
    pub blocks: Vec<BlockLine>,
    pub groups: Vec<GroupCard>,
    pub group_stats: GroupStats,
    pub partners: Vec<GroupCard>,
    pub rotations: Vec<RotationTable>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLine {
    pub order: u32,
    pub label: String,
    pub minutes: Minutes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCard {
    pub name: String,
    pub players: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationTable {
    pub name: String,
    /// Charged against the time budget.
    pub minutes: Minutes,
    /// What the builder shows: the longest station when simultaneous.
    pub builder_minutes: Minutes,
    pub simultaneous: bool,
    pub matrix: Vec<Vec<String>>,
    pub findings: Vec<String>,
}

impl PlanReport {
    pub fn build(
        practice: &Practice,
        roster: &[Player],
        drill_titles: &HashMap<String, String>,
        auto_water_breaks: bool,
    ) -> Self {
        let time = remaining_time(practice.total_minutes, &practice.session_blocks, auto_water_breaks);
        let groups = practice.groups.of_kind(GroupKind::Group);
        let names: HashMap<&str, &str> = roster.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect();

        let blocks = practice
            .session_blocks
            .iter()
            .map(|b| BlockLine {
                order: b.order(),
                label: block_label(b, drill_titles),
                minutes: block_duration(b),
            })
            .collect();

        let rotations = practice
            .session_blocks
            .iter()
            .filter_map(|b| match b {
                SessionBlock::Rotation(r) => Some(r),
                SessionBlock::Single(_) => None,
            })
            .map(|r| RotationTable {
                name: r.notes.clone().unwrap_or_else(|| "Rotation".to_string()),
                minutes: block_duration(&SessionBlock::Rotation(r.clone())),
                builder_minutes: builder_total(&r.rotation_drills, r.simultaneous_stations),
                simultaneous: r.simultaneous_stations,
                matrix: generate_rotation_matrix(&r.rotation_drills, &groups, drill_titles),
                findings: validate_rotation_block(r, &groups),
            })
            .collect();

        Self {
            practice_id: practice.id.clone(),
            date: practice.date.to_string(),
            status: time.status(),
            used_percent: time.used_percent(),
            time,
            water_break_after: water_break_positions(&practice.session_blocks),
            blocks,
            group_stats: group_stats(&groups),
            groups: cards(&groups, &names),
            partners: cards(&practice.groups.of_kind(GroupKind::Partner), &names),
            rotations,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let t = &self.time;

        let _ = writeln!(out, "Practice {} on {}", self.practice_id, self.date);
        let _ = writeln!(
            out,
            "Time: {} of {} used ({:.0}%), {} [{:?}]",
            format_time(i64::from(t.used_minutes)),
            format_time(i64::from(t.total_minutes)),
            self.used_percent,
            t.remaining_label(),
            self.status
        );
        if t.water_breaks_inserted > 0 {
            let _ = writeln!(out, "Auto water breaks: {}", t.water_breaks_inserted);
        }

        let _ = writeln!(out, "\nBlocks");
        for line in &self.blocks {
            let hint = if self.water_break_after.contains(&(line.order as usize + 1)) {
                "  <- water break after this block"
            } else {
                ""
            };
            let _ = writeln!(out, "  {:>2}. {:<24} {:>4}{hint}", line.order + 1, line.label, format_time(i64::from(line.minutes)));
        }

        if !self.groups.is_empty() {
            let s = &self.group_stats;
            let _ = writeln!(
                out,
                "\nGroups ({} players, {:.1} avg, {}-{} per group)",
                s.total_players, s.average_size, s.min_size, s.max_size
            );
            render_cards(&mut out, &self.groups);
        }
        if !self.partners.is_empty() {
            let _ = writeln!(out, "\nPartners");
            render_cards(&mut out, &self.partners);
        }

        for table in &self.rotations {
            let mode = if table.simultaneous { "simultaneous" } else { "rotating" };
            let _ = writeln!(
                out,
                "\nRotation: {} ({}, {} charged, {} in builder)",
                table.name,
                mode,
                format_time(i64::from(table.minutes)),
                format_time(i64::from(table.builder_minutes))
            );
            for row in &table.matrix {
                let _ = writeln!(out, "  {}", row.join("\t"));
            }
            for finding in &table.findings {
                let _ = writeln!(out, "  ! {finding}");
            }
        }

        out
    }
}

fn block_label(block: &SessionBlock, drill_titles: &HashMap<String, String>) -> String {
    if let Some(notes) = block.notes() {
        return notes.to_string();
    }
    match block {
        SessionBlock::Single(b) => b
            .drill_id
            .as_ref()
            .and_then(|id| drill_titles.get(id))
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string()),
        SessionBlock::Rotation(_) => "Rotation".to_string(),
    }
}

fn cards(groups: &[Group], names: &HashMap<&str, &str>) -> Vec<GroupCard> {
    groups
        .iter()
        .map(|g| GroupCard {
            name: g.name.clone(),
            players: g
                .player_ids
                .iter()
                .map(|id| names.get(id.as_str()).map(|n| n.to_string()).unwrap_or_else(|| id.clone()))
                .collect(),
        })
        .collect()
}

fn render_cards(out: &mut String, cards: &[GroupCard]) {
    for card in cards {
        let _ = writeln!(out, "  {:<10} {}", card.name, card.players.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan;
    use practice_core::{create_groups, present_players};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_report(auto: bool) -> PlanReport {
        let plan = plan::parse(include_str!("../plan.toml")).unwrap();
        let roster = plan.roster();
        let titles = plan.drill_titles();
        let present = present_players(&roster, &plan.attendance());
        let groups = create_groups(&present, 2, &mut ChaCha8Rng::seed_from_u64(7));
        let practice = plan.into_practice(groups).unwrap();
        PlanReport::build(&practice, &roster, &titles, auto)
    }

    #[test]
    fn sample_plan_fills_the_practice() {
        let report = sample_report(true);
        // 10 + 30 + 5 + 15 + 25 = 85 drill minutes, one owed break
        assert_eq!(report.time.used_minutes, 90);
        assert_eq!(report.time.water_breaks_inserted, 1);
        assert_eq!(report.time.remaining_minutes, 0);
        assert_eq!(report.status, TimeStatus::Critical);
        assert_eq!(report.water_break_after, vec![3]);

        let manual = sample_report(false);
        assert_eq!(manual.time.used_minutes, 85);
        assert_eq!(manual.time.remaining_minutes, 5);
    }

    #[test]
    fn absent_and_injured_players_are_left_out() {
        let report = sample_report(true);
        assert_eq!(report.group_stats.total_players, 10);
        let everyone: Vec<&String> = report.groups.iter().flat_map(|g| g.players.iter()).collect();
        assert!(!everyone.iter().any(|n| n.as_str() == "Gus" || n.as_str() == "June"));
    }

    #[test]
    fn rotation_tables_carry_builder_totals_and_findings() {
        let report = sample_report(true);
        assert_eq!(report.rotations.len(), 2);

        let circuit = &report.rotations[0];
        assert_eq!(circuit.name, "Hitting Circuit");
        assert_eq!((circuit.minutes, circuit.builder_minutes), (30, 30));
        assert_eq!(circuit.matrix[0], vec!["Time", "Group A", "Group B"]);
        assert_eq!(circuit.matrix[3][1], "Short Hops / Ground Balls");
        assert!(circuit.findings.is_empty());

        let battery = &report.rotations[1];
        assert_eq!((battery.minutes, battery.builder_minutes), (25, 15));
        assert_eq!(battery.findings.len(), 1);
    }

    #[test]
    fn rendered_report_mentions_every_section() {
        let text = sample_report(true).render();
        assert!(text.contains("Practice tuesday-practice on 2026-04-14"));
        assert!(text.contains("1h 30m of 1h 30m used"));
        assert!(text.contains("<- water break after this block"));
        assert!(text.contains("Rotation: Battery Work (simultaneous"));
        assert!(text.contains("  ! Station durations differ"));
    }
}
