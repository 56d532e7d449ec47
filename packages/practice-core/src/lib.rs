//! # practice-core
//!
//! Scheduling engine for youth-team practice plans.
//!
//! These functions are used by:
//! - `practice-backend`: recomputing time budgets, groups and rotation tables on every request
//! - `practice-cli`: offline planning from a TOML plan file
//!
//! ## Components
//! - [`duration`]: time cost of one session block
//! - [`water_breaks`]: rest intervals every 45 minutes of drill time
//! - [`time_budget`]: used / remaining / over-budget readout for a whole practice
//! - [`grouping`] and [`group_book`]: roster partitioning into groups and partners
//! - [`rotation`]: station rotation timing, validation and the printable matrix
//! - [`metrics`]: attendance rates and drill minutes per category over a date window
//!
//! Everything here is a pure function over borrowed inputs. Callers own all mutable
//! state and recompute on every edit.

pub mod duration;
pub mod error;
pub mod group_book;
pub mod grouping;
pub mod metrics;
pub mod model;
pub mod overrides;
pub mod rotation;
pub mod time_budget;
pub mod water_breaks;

pub use duration::{block_duration, station_duration, sum_minutes};
pub use error::PlannerError;
pub use group_book::GroupBook;
pub use grouping::{
    assign_groups_to_stations, balance_groups, create_groups, create_partners, group_stats,
    present_players, suggest_group_count, GroupAssignment, GroupStats,
};
pub use metrics::{attendance_rates, category_minutes, AttendanceRate, CategoryMinutes, MetricsRange};
pub use model::*;
pub use overrides::{effective_group, effective_groups, has_modified_members};
pub use rotation::{
    calculate_rotation, generate_rotation_matrix, validate_rotation, validate_rotation_block,
};
pub use time_budget::{format_time, remaining_time, TimeStatus};
pub use water_breaks::{water_break_positions, water_breaks_needed};
