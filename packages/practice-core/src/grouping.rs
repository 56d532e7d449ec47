//! grouping.rs: Roster partitioning into groups and partner units
//!
//! Randomness is injected: every shuffling function takes the caller's RNG, so
//! a seeded generator reproduces the exact same partition (ids included).

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Builder;

use crate::model::{Group, GroupKind, Player, RotationDrill};

const GROUP_LETTERS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

// Preferred group size band for rotations
const MIN_GROUP_SIZE: usize = 3;
const MAX_GROUP_SIZE: usize = 5;

fn new_group_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

fn group_name(index: usize) -> String {
    match GROUP_LETTERS.get(index) {
        Some(letter) => format!("Group {letter}"),
        None => format!("Group {}", index + 1),
    }
}

fn shuffled_ids<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Vec<String> {
    let mut ids: Vec<String> = players.iter().map(|p| p.id.clone()).collect();
    ids.shuffle(rng);
    ids
}

/// Active players whose attendance flag is exactly `true`.
pub fn present_players(players: &[Player], attendance: &HashMap<String, bool>) -> Vec<Player> {
    players
        .iter()
        .filter(|p| p.is_active() && attendance.get(&p.id).copied().unwrap_or(false))
        .cloned()
        .collect()
}

/// Shuffles the present players and deals them round-robin into `count` groups,
/// so sizes differ by at most one. `count` is clamped to the player count.
pub fn create_groups<R: Rng + ?Sized>(present: &[Player], count: usize, rng: &mut R) -> Vec<Group> {
    if count == 0 || present.is_empty() {
        return Vec::new();
    }

    let actual = count.min(present.len());
    if actual < count {
        warn!("requested {count} groups for {} players, creating {actual}", present.len());
    }

    let mut groups: Vec<Group> = (0..actual)
        .map(|i| Group::new(new_group_id(rng), group_name(i), GroupKind::Group))
        .collect();

    for (i, player_id) in shuffled_ids(present, rng).into_iter().enumerate() {
        groups[i % actual].player_ids.push(player_id);
    }

    debug!("created {actual} groups from {} players", present.len());
    groups
}

/// Pairs shuffled players. With an odd count the last pair takes the leftover
/// player and becomes a trio; no unit ever has a single player.
pub fn create_partners<R: Rng + ?Sized>(present: &[Player], rng: &mut R) -> Vec<Group> {
    let pair_count = present.len() / 2;
    if pair_count == 0 {
        return Vec::new();
    }

    let ids = shuffled_ids(present, rng);
    let mut partners: Vec<Group> = ids
        .chunks(2)
        .take(pair_count)
        .enumerate()
        .map(|(i, pair)| {
            let mut group =
                Group::new(new_group_id(rng), format!("Partners {}", i + 1), GroupKind::Partner);
            group.player_ids.extend_from_slice(pair);
            group
        })
        .collect();

    if ids.len() % 2 == 1 {
        if let (Some(last), Some(leftover)) = (partners.last_mut(), ids.last()) {
            last.player_ids.push(leftover.clone());
        }
    }

    debug!("created {} partner units from {} players", partners.len(), present.len());
    partners
}

/// Evens out membership across the same groups without reshuffling.
///
/// Groups are ordered largest first (stable), their members concatenated in that
/// order, then sliced back so the first `total % n` groups get one extra player.
/// Identity (id, name, kind) is kept; the result comes back in the sorted order.
pub fn balance_groups(groups: &[Group]) -> Vec<Group> {
    if groups.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<Group> = groups.to_vec();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));

    let all_ids: Vec<String> = sorted.iter().flat_map(|g| g.player_ids.iter().cloned()).collect();
    let target = all_ids.len() / sorted.len();
    let remainder = all_ids.len() % sorted.len();

    let mut cursor = 0;
    for (i, group) in sorted.iter_mut().enumerate() {
        let size = if i < remainder { target + 1 } else { target };
        group.player_ids = all_ids[cursor..cursor + size].to_vec();
        cursor += size;
    }

    sorted
}

/// Suggests how many groups to build for `player_count` players and
/// `drill_count` rotation stations, aiming for 3–5 players per group.
pub fn suggest_group_count(player_count: usize, drill_count: usize) -> usize {
    if player_count == 0 {
        return 0;
    }

    let min_groups = player_count.div_ceil(MAX_GROUP_SIZE);
    let max_groups = player_count / MIN_GROUP_SIZE;
    if (min_groups..=max_groups).contains(&drill_count) {
        return drill_count;
    }

    // round(players / 4), half up
    ((player_count + 2) / 4).max(1)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub total_players: usize,
    pub average_size: f64,
    pub min_size: usize,
    pub max_size: usize,
}

pub fn group_stats(groups: &[Group]) -> GroupStats {
    let sizes: Vec<usize> = groups.iter().map(Group::len).collect();
    let total_players: usize = sizes.iter().sum();
    GroupStats {
        total_players,
        average_size: if sizes.is_empty() { 0.0 } else { total_players as f64 / sizes.len() as f64 },
        min_size: sizes.iter().copied().min().unwrap_or(0),
        max_size: sizes.iter().copied().max().unwrap_or(0),
    }
}

/// Which step of the rotation a group reaches a station on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignment {
    pub group_id: String,
    pub drill_id: String,
    pub rotation_order: usize,
}

/// Each group starts at a different station: station `s` is visited by group `g`
/// at step `(s - g) mod stations`.
pub fn assign_groups_to_stations(groups: &[Group], stations: &[RotationDrill]) -> Vec<GroupAssignment> {
    let n = stations.len();
    let mut assignments = Vec::with_capacity(groups.len() * n);

    for (g, group) in groups.iter().enumerate() {
        for (s, station) in stations.iter().enumerate() {
            assignments.push(GroupAssignment {
                group_id: group.id.clone(),
                drill_id: station.drills.first().map(|d| d.drill_id.clone()).unwrap_or_default(),
                rotation_order: (s + n - g % n) % n,
            });
        }
    }

    assignments
}
