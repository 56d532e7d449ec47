use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use practice_core::renumber_blocks;

use crate::state::PlannerState;

/// Load persisted state from disk. Returns default if file missing or corrupt.
pub async fn load_state(path: &Path) -> PlannerState {
    if !path.exists() {
        info!("No {} found, using empty state", path.display());
        return PlannerState::default();
    }

    match fs::read_to_string(path).await {
        Ok(data) => match serde_json::from_str::<PlannerState>(&data) {
            Ok(mut state) => {
                // Block order is positional; repair any gaps left by hand edits
                for practice in state.practices.values_mut() {
                    let mut blocks = std::mem::take(&mut practice.session_blocks);
                    blocks.sort_by_key(|b| b.order());
                    practice.session_blocks = renumber_blocks(blocks);
                }
                info!(
                    "Loaded state from disk ({} players, {} drills, {} practices)",
                    state.players.len(),
                    state.catalog.drills.len(),
                    state.practices.len()
                );
                state
            }
            Err(e) => {
                warn!("Failed to parse {}: {e}, using empty state", path.display());
                PlannerState::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {e}, using empty state", path.display());
            PlannerState::default()
        }
    }
}

/// Write a pretty-printed snapshot. The file is replaced via a sibling temp
/// file so a crash mid-write never leaves half a document behind.
pub async fn save_state(path: &Path, state: &PlannerState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use practice_core::{Player, Practice, SessionBlock};

    fn practice() -> Practice {
        let mut late = SessionBlock::single("b2", "d2", 10);
        if let SessionBlock::Single(b) = &mut late {
            b.order = 7;
        }
        Practice {
            id: "p1".into(),
            date: NaiveDate::from_ymd_opt(2026, 4, 14).unwrap(),
            total_minutes: 90,
            attendance: Default::default(),
            groups: Default::default(),
            session_blocks: vec![late, SessionBlock::single("b1", "d1", 15)],
            status: Default::default(),
            post_practice_notes: String::new(),
        }
    }

    #[tokio::test]
    async fn missing_file_gives_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_state(&dir.path().join("state.json")).await;
        assert_eq!(state, PlannerState::default());
    }

    #[tokio::test]
    async fn corrupt_file_gives_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_state(&path).await, PlannerState::default());
    }

    #[tokio::test]
    async fn snapshot_survives_a_restart_with_blocks_renumbered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = PlannerState::default();
        state.players.push(Player::new("pl1", "Ava"));
        state.practices.insert("p1".into(), practice());
        save_state(&path, &state).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load_state(&path).await;
        assert_eq!(loaded.players, state.players);
        let blocks = &loaded.practices["p1"].session_blocks;
        assert_eq!(blocks.iter().map(|b| b.id()).collect::<Vec<_>>(), vec!["b1", "b2"]);
        assert_eq!(blocks.iter().map(|b| b.order()).collect::<Vec<_>>(), vec![0, 1]);
    }
}
