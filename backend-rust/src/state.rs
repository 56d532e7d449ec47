use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use practice_core::{Coach, Drill, Player, Practice};

use crate::config::BackendConfig;

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub drills: Vec<Drill>,
    #[serde(default)]
    pub coaches: Vec<Coach>,
}

impl Catalog {
    pub fn drill_titles(&self) -> HashMap<String, String> {
        self.drills.iter().map(|d| (d.id.clone(), d.title.clone())).collect()
    }
}

// ─── Full Planner State ───────────────────────────────────────────────────────

/// Everything the service owns: one team's roster, its drill and coach
/// catalogs and every practice keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannerState {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub practices: HashMap<String, Practice>,
}

impl PlannerState {
    /// Practices ordered by date, newest first.
    pub fn practices_by_date(&self) -> Vec<&Practice> {
        let mut list: Vec<&Practice> = self.practices.values().collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        list
    }
}

// ─── Shared Handles ───────────────────────────────────────────────────────────

pub type SharedState = Arc<RwLock<PlannerState>>;

#[derive(Clone)]
pub struct AppState {
    pub planner: SharedState,
    pub config: Arc<BackendConfig>,
}

impl AppState {
    pub fn new(planner: PlannerState, config: BackendConfig) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            config: Arc::new(config),
        }
    }
}
