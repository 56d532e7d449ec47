//! overrides.rs: Per-drill and per-station group overlays
//!
//! A block or station may carry a sparse map of locally edited groups keyed by
//! the practice-level group id. The effective group in that context is the
//! overlay entry when present, else the practice group of the same id.

use std::collections::{HashMap, HashSet};

use crate::model::Group;

pub fn effective_group<'a>(
    group_id: &str,
    overrides: &'a HashMap<String, Group>,
    base: &'a [Group],
) -> Option<&'a Group> {
    overrides
        .get(group_id)
        .or_else(|| base.iter().find(|g| g.id == group_id))
}

/// Resolves every id in `group_ids`, skipping ids known to neither side.
pub fn effective_groups(
    group_ids: &[String],
    overrides: &HashMap<String, Group>,
    base: &[Group],
) -> Vec<Group> {
    group_ids
        .iter()
        .filter_map(|id| effective_group(id, overrides, base))
        .cloned()
        .collect()
}

/// True when any overlay differs in membership (order-insensitive) from the
/// practice group it shadows, or shadows a group that no longer exists.
pub fn has_modified_members(overrides: &HashMap<String, Group>, base: &[Group]) -> bool {
    overrides.iter().any(|(id, local)| match base.iter().find(|g| &g.id == id) {
        None => true,
        Some(original) => {
            let mut a = original.player_ids.clone();
            let mut b = local.player_ids.clone();
            a.sort();
            b.sort();
            a != b
        }
    })
}

/// Practice-group members dropped from every overlay group, paired with the
/// name of the practice group they came from.
pub fn unassigned_override_players(
    overrides: &HashMap<String, Group>,
    base: &[Group],
) -> Vec<(String, String)> {
    let placed: HashSet<&String> = overrides.values().flat_map(|g| g.player_ids.iter()).collect();

    base.iter()
        .flat_map(|g| g.player_ids.iter().map(move |p| (p, &g.name)))
        .filter(|(p, _)| !placed.contains(p))
        .map(|(p, name)| (p.clone(), name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupKind;

    fn group(id: &str, players: &[&str]) -> Group {
        let mut g = Group::new(id, format!("Partners {id}"), GroupKind::Partner);
        g.player_ids = players.iter().map(|p| p.to_string()).collect();
        g
    }

    #[test]
    fn overlay_wins_over_practice_group() {
        let base = vec![group("1", &["a", "b"]), group("2", &["c", "d"])];
        let overrides: HashMap<String, Group> =
            [("1".to_string(), group("1", &["a", "c"]))].into_iter().collect();

        assert_eq!(effective_group("1", &overrides, &base).unwrap().player_ids, vec!["a", "c"]);
        assert_eq!(effective_group("2", &overrides, &base).unwrap().player_ids, vec!["c", "d"]);
        assert!(effective_group("3", &overrides, &base).is_none());

        let ids = vec!["2".to_string(), "3".to_string(), "1".to_string()];
        let resolved = effective_groups(&ids, &overrides, &base);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].player_ids, vec!["a", "c"]);
    }

    #[test]
    fn modification_ignores_member_order() {
        let base = vec![group("1", &["a", "b"])];
        let same: HashMap<String, Group> = [("1".to_string(), group("1", &["b", "a"]))].into_iter().collect();
        assert!(!has_modified_members(&same, &base));

        let changed: HashMap<String, Group> = [("1".to_string(), group("1", &["a"]))].into_iter().collect();
        assert!(has_modified_members(&changed, &base));

        let orphan: HashMap<String, Group> = [("9".to_string(), group("9", &[]))].into_iter().collect();
        assert!(has_modified_members(&orphan, &base));
        assert!(!has_modified_members(&HashMap::new(), &base));
    }

    #[test]
    fn dropped_players_are_reported_with_origin() {
        let base = vec![group("1", &["a", "b"]), group("2", &["c"])];
        let overrides: HashMap<String, Group> = [
            ("1".to_string(), group("1", &["a"])),
            ("2".to_string(), group("2", &["c"])),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            unassigned_override_players(&overrides, &base),
            vec![("b".to_string(), "Partners 1".to_string())]
        );
    }
}
