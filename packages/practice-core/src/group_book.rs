//! group_book.rs: Keyed collection of a practice's groups and partner units
//!
//! Both partition kinds share one collection but are edited independently.
//! Every hand edit keeps a player in at most one group per kind.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PlannerError;
use crate::grouping::balance_groups;
use crate::model::{Group, GroupKind, Player};

/// Ordered so group cards render in creation order ("Group A", "Group B", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct GroupBook {
    groups: Vec<Group>,
}

impl GroupBook {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn all(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn of_kind(&self, kind: GroupKind) -> Vec<Group> {
        self.groups.iter().filter(|g| g.kind == kind).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    fn get_mut(&mut self, group_id: &str) -> Result<&mut Group, PlannerError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| PlannerError::UnknownGroup(group_id.to_string()))
    }

    /// Swaps out every group of `kind` for `replacement`; the other kind is untouched.
    pub fn replace_kind(&mut self, kind: GroupKind, replacement: Vec<Group>) {
        self.groups.retain(|g| g.kind != kind);
        self.groups.extend(replacement.into_iter().map(|mut g| {
            g.kind = kind;
            g
        }));
        info!("Replaced {kind:?} partition ({} total units)", self.groups.len());
    }

    pub fn clear_kind(&mut self, kind: GroupKind) {
        self.groups.retain(|g| g.kind != kind);
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Rebalances only the groups of `kind`. Every group keeps its slot.
    pub fn balance_kind(&mut self, kind: GroupKind) {
        let balanced = balance_groups(&self.of_kind(kind));
        for group in balanced {
            if let Some(slot) = self.groups.iter_mut().find(|g| g.id == group.id) {
                slot.player_ids = group.player_ids;
            }
        }
        debug!("Balanced {kind:?} partition");
    }

    pub fn rename(&mut self, group_id: &str, name: &str) -> Result<(), PlannerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::EmptyName);
        }
        self.get_mut(group_id)?.name = name.to_string();
        Ok(())
    }

    /// Adds a player to a group unless they already sit in a group of the same kind.
    pub fn add_player(&mut self, group_id: &str, player_id: &str) -> Result<(), PlannerError> {
        let kind = self.get(group_id).map(|g| g.kind).ok_or_else(|| PlannerError::UnknownGroup(group_id.to_string()))?;

        if let Some(holder) = self.groups.iter().find(|g| g.kind == kind && g.contains(player_id)) {
            return Err(PlannerError::AlreadyAssigned {
                player_id: player_id.to_string(),
                group_name: holder.name.clone(),
            });
        }

        self.get_mut(group_id)?.player_ids.push(player_id.to_string());
        debug!("added {player_id} to {group_id}");
        Ok(())
    }

    pub fn remove_player(&mut self, group_id: &str, player_id: &str) -> Result<(), PlannerError> {
        let group = self.get_mut(group_id)?;
        if !group.contains(player_id) {
            return Err(PlannerError::NotInGroup {
                player_id: player_id.to_string(),
                group_id: group_id.to_string(),
            });
        }
        group.player_ids.retain(|id| id != player_id);
        Ok(())
    }

    /// Drag-move between two groups of the same kind. Moving onto the source
    /// group is a no-op.
    pub fn move_player(&mut self, player_id: &str, from_id: &str, to_id: &str) -> Result<(), PlannerError> {
        let from = self.get(from_id).ok_or_else(|| PlannerError::UnknownGroup(from_id.to_string()))?;
        let to = self.get(to_id).ok_or_else(|| PlannerError::UnknownGroup(to_id.to_string()))?;

        if from.kind != to.kind {
            return Err(PlannerError::KindMismatch { from: from.kind, to: to.kind });
        }
        if from_id == to_id {
            return Ok(());
        }

        self.remove_player(from_id, player_id)?;
        self.get_mut(to_id)?.player_ids.push(player_id.to_string());
        debug!("moved {player_id}: {from_id} -> {to_id}");
        Ok(())
    }

    /// Present players not yet placed in any group of `kind`.
    pub fn unassigned<'a>(&self, kind: GroupKind, present: &'a [Player]) -> Vec<&'a Player> {
        present
            .iter()
            .filter(|p| !self.groups.iter().any(|g| g.kind == kind && g.contains(&p.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, kind: GroupKind, players: &[&str]) -> Group {
        let mut g = Group::new(id, id.to_uppercase(), kind);
        g.player_ids = players.iter().map(|p| p.to_string()).collect();
        g
    }

    fn book() -> GroupBook {
        GroupBook::new(vec![
            group("a", GroupKind::Group, &["p1", "p2"]),
            group("b", GroupKind::Group, &["p3"]),
            group("x", GroupKind::Partner, &["p1", "p3"]),
            group("y", GroupKind::Partner, &["p2"]),
        ])
    }

    #[test]
    fn replace_kind_keeps_other_partition() {
        let mut book = book();
        book.replace_kind(GroupKind::Group, vec![group("c", GroupKind::Partner, &["p1"])]);
        assert_eq!(book.of_kind(GroupKind::Group).len(), 1);
        assert_eq!(book.of_kind(GroupKind::Group)[0].id, "c");
        assert_eq!(book.of_kind(GroupKind::Partner).len(), 2);
    }

    #[test]
    fn clear_kind_and_clear() {
        let mut book = book();
        book.clear_kind(GroupKind::Partner);
        assert_eq!(book.len(), 2);
        book.clear();
        assert!(book.is_empty());
    }

    #[test]
    fn move_within_same_kind() {
        let mut book = book();
        book.move_player("p1", "a", "b").unwrap();
        assert_eq!(book.get("a").unwrap().player_ids, vec!["p2"]);
        assert_eq!(book.get("b").unwrap().player_ids, vec!["p3", "p1"]);
    }

    #[test]
    fn move_across_kinds_is_rejected() {
        let mut book = book();
        let err = book.move_player("p1", "a", "y").unwrap_err();
        assert_eq!(err, PlannerError::KindMismatch { from: GroupKind::Group, to: GroupKind::Partner });
        assert_eq!(book, self::book());
    }

    #[test]
    fn move_of_absent_player_is_rejected() {
        let mut book = book();
        assert!(matches!(book.move_player("p9", "a", "b"), Err(PlannerError::NotInGroup { .. })));
        assert!(matches!(book.move_player("p1", "a", "zz"), Err(PlannerError::UnknownGroup(_))));
    }

    #[test]
    fn add_player_enforces_one_group_per_kind() {
        let mut book = book();
        let err = book.add_player("b", "p1").unwrap_err();
        assert_eq!(
            err,
            PlannerError::AlreadyAssigned { player_id: "p1".into(), group_name: "A".into() }
        );
        book.add_player("b", "p4").unwrap();
        // p4 can still join a partner unit
        book.add_player("y", "p4").unwrap();
        assert!(book.get("y").unwrap().contains("p4"));
    }

    #[test]
    fn remove_and_rename() {
        let mut book = book();
        book.remove_player("a", "p2").unwrap();
        assert_eq!(book.get("a").unwrap().player_ids, vec!["p1"]);
        book.rename("a", "  Sluggers ").unwrap();
        assert_eq!(book.get("a").unwrap().name, "Sluggers");
        assert_eq!(book.rename("a", "   "), Err(PlannerError::EmptyName));
    }

    #[test]
    fn balance_kind_only_touches_that_kind() {
        let mut book = GroupBook::new(vec![
            group("a", GroupKind::Group, &["p1", "p2", "p3", "p4"]),
            group("b", GroupKind::Group, &[]),
            group("x", GroupKind::Partner, &["p1", "p2", "p3"]),
            group("y", GroupKind::Partner, &[]),
        ]);
        book.balance_kind(GroupKind::Group);
        assert_eq!(book.get("a").unwrap().len(), 2);
        assert_eq!(book.get("b").unwrap().len(), 2);
        assert_eq!(book.get("x").unwrap().len(), 3);
    }

    #[test]
    fn balance_kind_keeps_creation_order() {
        let mut book = GroupBook::new(vec![
            group("a", GroupKind::Group, &["p1"]),
            group("x", GroupKind::Partner, &["p1", "p2", "p3"]),
            group("b", GroupKind::Group, &["p2", "p3", "p4"]),
            group("y", GroupKind::Partner, &["p4"]),
        ]);
        book.balance_kind(GroupKind::Group);

        let ids: Vec<&str> = book.all().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "x", "b", "y"]);
        assert_eq!(book.get("a").unwrap().len(), 2);
        assert_eq!(book.get("b").unwrap().len(), 2);
        assert_eq!(book.get("y").unwrap().len(), 1);
    }

    #[test]
    fn unassigned_players_per_kind() {
        let book = book();
        let present = vec![Player::new("p1", "One"), Player::new("p4", "Four")];
        let ids: Vec<&str> = book.unassigned(GroupKind::Group, &present).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p4"]);
    }

    #[test]
    fn serializes_as_ordered_list() {
        let json = serde_json::to_value(book()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[2]["type"], "partner");
        let back: GroupBook = serde_json::from_value(json).unwrap();
        assert_eq!(back, book());
    }
}
