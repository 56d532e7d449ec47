//! error.rs: Rejections for manual group edits
//!
//! Scheduling and time functions never fail: they clamp or degrade to empty
//! results. Only the hand-edit operations on a [`crate::GroupBook`] can be refused.

use thiserror::Error;

use crate::model::GroupKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("group {0} not found")]
    UnknownGroup(String),

    #[error("cannot move a player from a {from:?} to a {to:?}")]
    KindMismatch { from: GroupKind, to: GroupKind },

    #[error("player {player_id} is already assigned to {group_name}")]
    AlreadyAssigned { player_id: String, group_name: String },

    #[error("player {player_id} is not in group {group_id}")]
    NotInGroup { player_id: String, group_id: String },

    #[error("group name cannot be empty")]
    EmptyName,

    #[error("add at least one station to the rotation")]
    EmptyRotation,
}
