use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use practice_core::rotation::{assign_all_groups, auto_assign_groups, builder_total, stations_balanced, sync_to_longest, RotationDraft};
use practice_core::{
    assign_groups_to_stations, attendance_rates, block_duration, calculate_rotation, category_minutes, create_groups,
    create_partners, format_time, generate_rotation_matrix, present_players, remaining_time, renumber_blocks,
    suggest_group_count, validate_rotation_block, water_break_positions, AttendanceRate, CategoryMinutes, Group,
    GroupAssignment, GroupKind, MetricsRange, Minutes, Player, Practice, RotationResult, SessionBlock,
    TimeEngineResult, TimeStatus,
};

use crate::error::{ApiError, ApiResult};
use crate::persistence::save_state;
use crate::state::{AppState, Catalog, PlannerState};

// ─── Router ───────────────────────────────────────────────────────────────────

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/roster", get(get_roster).put(put_roster))
        .route("/catalog", get(get_catalog).put(put_catalog))
        .route("/practices", get(list_practices))
        .route("/practices/:id", get(get_practice).put(put_practice).delete(delete_practice))
        .route("/practices/:id/attendance", put(put_attendance))
        .route("/practices/:id/time", get(practice_time))
        .route("/practices/:id/groups", post(create_practice_groups).delete(clear_groups))
        .route("/practices/:id/partners", post(create_practice_partners))
        .route("/practices/:id/groups/balance", post(balance_groups))
        .route("/practices/:id/groups/move", post(move_player))
        .route("/practices/:id/groups/:gid/rename", post(rename_group))
        .route("/practices/:id/groups/:gid/players", post(add_player))
        .route("/practices/:id/groups/:gid/players/:pid", delete(remove_player))
        .route("/practices/:id/suggested-groups", get(suggested_groups))
        .route("/practices/:id/blocks/:bid/rotation", post(rotation_view))
        .route("/practices/:id/water-break", post(add_water_break))
        .route("/metrics", get(metrics))
        .with_state(app)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Saves `next` and only then swaps it in, so a failed write leaves the live
/// state untouched.
async fn commit(app: &AppState, live: &mut PlannerState, next: PlannerState) -> ApiResult<()> {
    save_state(&app.config.state_file, &next).await?;
    *live = next;
    Ok(())
}

fn practice<'a>(state: &'a PlannerState, id: &str) -> ApiResult<&'a Practice> {
    state
        .practices
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("practice {id}")))
}

fn practice_mut<'a>(state: &'a mut PlannerState, id: &str) -> ApiResult<&'a mut Practice> {
    state
        .practices
        .get_mut(id)
        .ok_or_else(|| ApiError::NotFound(format!("practice {id}")))
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ─── Roster & Catalog ─────────────────────────────────────────────────────────

async fn health() -> &'static str {
    "practice-backend ok"
}

async fn get_roster(State(app): State<AppState>) -> Json<Vec<Player>> {
    Json(app.planner.read().await.players.clone())
}

async fn put_roster(State(app): State<AppState>, Json(players): Json<Vec<Player>>) -> ApiResult<Json<Vec<Player>>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    next.players = players;
    commit(&app, &mut state, next).await?;
    info!("👥 Roster replaced ({} players)", state.players.len());
    Ok(Json(state.players.clone()))
}

async fn get_catalog(State(app): State<AppState>) -> Json<Catalog> {
    Json(app.planner.read().await.catalog.clone())
}

async fn put_catalog(State(app): State<AppState>, Json(catalog): Json<Catalog>) -> ApiResult<Json<Catalog>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    next.catalog = catalog;
    commit(&app, &mut state, next).await?;
    info!(
        "📚 Catalog replaced ({} drills, {} coaches)",
        state.catalog.drills.len(),
        state.catalog.coaches.len()
    );
    Ok(Json(state.catalog.clone()))
}

// ─── Practice CRUD ────────────────────────────────────────────────────────────

async fn list_practices(State(app): State<AppState>) -> Json<Vec<Practice>> {
    let state = app.planner.read().await;
    Json(state.practices_by_date().into_iter().cloned().collect())
}

async fn get_practice(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Practice>> {
    let state = app.planner.read().await;
    Ok(Json(practice(&state, &id)?.clone()))
}

/// Creates or replaces the whole aggregate. The path id wins over the body.
async fn put_practice(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(mut incoming): Json<Practice>,
) -> ApiResult<Json<Practice>> {
    incoming.id = id.clone();
    incoming.session_blocks = renumber_blocks(incoming.session_blocks);

    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let created = next.practices.insert(id.clone(), incoming.clone()).is_none();
    commit(&app, &mut state, next).await?;

    info!(
        "🗓  Practice {id} {} ({} on {}, {} blocks)",
        if created { "created" } else { "updated" },
        format_time(i64::from(incoming.total_minutes)),
        incoming.date,
        incoming.session_blocks.len()
    );
    Ok(Json(incoming))
}

async fn delete_practice(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    if next.practices.remove(&id).is_none() {
        return Err(ApiError::NotFound(format!("practice {id}")));
    }
    commit(&app, &mut state, next).await?;
    info!("🗑  Practice {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn put_attendance(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(attendance): Json<HashMap<String, bool>>,
) -> ApiResult<Json<HashMap<String, bool>>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let present = attendance.values().filter(|&&here| here).count();
    practice_mut(&mut next, &id)?.attendance = attendance.clone();
    commit(&app, &mut state, next).await?;
    info!("✅ Attendance for {id}: {present} present");
    Ok(Json(attendance))
}

// ─── Time Budget ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeQuery {
    auto_water_breaks: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeReport {
    #[serde(flatten)]
    pub result: TimeEngineResult,
    pub status: TimeStatus,
    pub used_percent: f64,
    pub used_label: String,
    pub remaining_label: String,
    /// Insertion indices for suggested water breaks.
    pub water_break_positions: Vec<usize>,
}

fn time_report(practice: &Practice, auto_water_breaks: bool) -> TimeReport {
    let result = remaining_time(practice.total_minutes, &practice.session_blocks, auto_water_breaks);
    TimeReport {
        status: result.status(),
        used_percent: result.used_percent(),
        used_label: format_time(i64::from(result.used_minutes)),
        remaining_label: result.remaining_label(),
        water_break_positions: water_break_positions(&practice.session_blocks),
        result,
    }
}

async fn practice_time(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TimeQuery>,
) -> ApiResult<Json<TimeReport>> {
    let state = app.planner.read().await;
    let auto = query.auto_water_breaks.unwrap_or(app.config.auto_water_breaks);
    Ok(Json(time_report(practice(&state, &id)?, auto)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WaterBreakRequest {
    /// Insert before the block currently at this index; appended when absent.
    position: Option<usize>,
}

async fn add_water_break(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<WaterBreakRequest>>,
) -> ApiResult<Json<Practice>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let updated = {
        let practice = practice_mut(&mut next, &id)?;
        let len = practice.session_blocks.len();
        let at = request.position.unwrap_or(len).min(len);

        let mut blocks = std::mem::take(&mut practice.session_blocks);
        blocks.insert(at, SessionBlock::water_break(uuid::Uuid::new_v4().to_string(), at as u32));
        practice.session_blocks = renumber_blocks(blocks);
        practice.clone()
    };
    commit(&app, &mut state, next).await?;
    info!("💧 Water break added to {id} at position {}", request.position.unwrap_or(updated.session_blocks.len() - 1));
    Ok(Json(updated))
}

// ─── Groups & Partners ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupsRequest {
    count: i64,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    seed: Option<u64>,
}

async fn create_practice_groups(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateGroupsRequest>,
) -> ApiResult<Json<Vec<Group>>> {
    let count = if request.count < 1 {
        warn!("Group count {} clamped to 1", request.count);
        1
    } else {
        request.count as usize
    };

    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let present = present_players(&next.players, &practice(&next, &id)?.attendance);
    let groups = create_groups(&present, count, &mut seeded_rng(request.seed));

    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.replace_kind(GroupKind::Group, groups);
    let groups = book.of_kind(GroupKind::Group);

    commit(&app, &mut state, next).await?;
    info!("🎲 {} groups created for {id} from {} present players", groups.len(), present.len());
    Ok(Json(groups))
}

async fn create_practice_partners(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<SeedRequest>>,
) -> ApiResult<Json<Vec<Group>>> {
    let seed = body.map(|Json(r)| r).unwrap_or_default().seed;

    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let present = present_players(&next.players, &practice(&next, &id)?.attendance);
    let partners = create_partners(&present, &mut seeded_rng(seed));

    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.replace_kind(GroupKind::Partner, partners);
    let partners = book.of_kind(GroupKind::Partner);

    commit(&app, &mut state, next).await?;
    info!("🤝 {} partner units created for {id}", partners.len());
    Ok(Json(partners))
}

async fn balance_groups(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<Group>>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.balance_kind(GroupKind::Group);
    let groups = book.of_kind(GroupKind::Group);
    commit(&app, &mut state, next).await?;
    Ok(Json(groups))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    player_id: String,
    from_group_id: String,
    to_group_id: String,
}

async fn move_player(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<Json<Vec<Group>>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.move_player(&request.player_id, &request.from_group_id, &request.to_group_id)?;
    let groups = book.all().to_vec();
    commit(&app, &mut state, next).await?;
    Ok(Json(groups))
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    name: String,
}

async fn rename_group(
    State(app): State<AppState>,
    Path((id, gid)): Path<(String, String)>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<Json<Group>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.rename(&gid, &request.name)?;
    let group = book.get(&gid).cloned().ok_or_else(|| ApiError::NotFound(format!("group {gid}")))?;
    commit(&app, &mut state, next).await?;
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    player_id: String,
}

async fn add_player(
    State(app): State<AppState>,
    Path((id, gid)): Path<(String, String)>,
    Json(request): Json<PlayerRef>,
) -> ApiResult<Json<Group>> {
    let mut state = app.planner.write().await;
    if !state.players.iter().any(|p| p.id == request.player_id) {
        return Err(ApiError::NotFound(format!("player {}", request.player_id)));
    }
    let mut next = state.clone();
    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.add_player(&gid, &request.player_id)?;
    let group = book.get(&gid).cloned().ok_or_else(|| ApiError::NotFound(format!("group {gid}")))?;
    commit(&app, &mut state, next).await?;
    Ok(Json(group))
}

async fn remove_player(
    State(app): State<AppState>,
    Path((id, gid, pid)): Path<(String, String, String)>,
) -> ApiResult<Json<Group>> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let book = &mut practice_mut(&mut next, &id)?.groups;
    book.remove_player(&gid, &pid)?;
    let group = book.get(&gid).cloned().ok_or_else(|| ApiError::NotFound(format!("group {gid}")))?;
    commit(&app, &mut state, next).await?;
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    kind: Option<GroupKind>,
}

async fn clear_groups(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ClearQuery>,
) -> ApiResult<StatusCode> {
    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let book = &mut practice_mut(&mut next, &id)?.groups;
    match query.kind {
        Some(kind) => book.clear_kind(kind),
        None => book.clear(),
    }
    commit(&app, &mut state, next).await?;
    info!("🧹 Cleared {} for {id}", query.kind.map_or("all groups".to_string(), |k| format!("{k:?} units")));
    Ok(StatusCode::NO_CONTENT)
}

async fn suggested_groups(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let state = app.planner.read().await;
    let practice = practice(&state, &id)?;
    let present = present_players(&state.players, &practice.attendance).len();
    let rotations = practice.rotation_block_count();
    Ok(Json(json!({
        "presentPlayers": present,
        "rotationBlocks": rotations,
        "suggested": suggest_group_count(present, rotations),
    })))
}

// ─── Rotation Blocks ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignMode {
    /// Station `i` gets group `i mod groups`.
    Cycle,
    All,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RotationRequest {
    #[serde(default)]
    sync_to_longest: bool,
    assign: Option<AssignMode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationView {
    pub block_id: String,
    pub name: String,
    pub simultaneous: bool,
    /// Charged against the practice budget.
    pub block_minutes: Minutes,
    pub builder_minutes: Minutes,
    pub balanced: bool,
    pub schedule: RotationResult,
    pub matrix: Vec<Vec<String>>,
    pub findings: Vec<String>,
    pub assignments: Vec<GroupAssignment>,
}

/// Schedule, matrix and findings for one rotation block. Optional fixes
/// (sync to the longest station, auto group assignment) are saved first.
async fn rotation_view(
    State(app): State<AppState>,
    Path((id, bid)): Path<(String, String)>,
    body: Option<Json<RotationRequest>>,
) -> ApiResult<Json<RotationView>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let mut state = app.planner.write().await;
    let mut next = state.clone();
    let titles = next.catalog.drill_titles();
    let practice = practice_mut(&mut next, &id)?;
    let practice_groups = practice.groups.of_kind(GroupKind::Group);

    let block = practice
        .session_blocks
        .iter_mut()
        .find(|b| b.id() == bid)
        .ok_or_else(|| ApiError::NotFound(format!("block {bid}")))?;
    let SessionBlock::Rotation(rotation) = block else {
        return Err(ApiError::BadRequest(format!("block {bid} is not a rotation")));
    };

    let changed = request.sync_to_longest || request.assign.is_some();
    if request.sync_to_longest {
        rotation.rotation_drills = sync_to_longest(&rotation.rotation_drills);
    }
    match request.assign {
        Some(AssignMode::Cycle) => rotation.rotation_drills = auto_assign_groups(&rotation.rotation_drills, &practice_groups),
        Some(AssignMode::All) => rotation.rotation_drills = assign_all_groups(&rotation.rotation_drills, &practice_groups),
        None => {}
    }

    let groups = RotationDraft::from_block(rotation).effective_groups(&practice_groups);
    let stations = &rotation.rotation_drills;
    let station_count = stations.len();
    let view = RotationView {
        block_id: rotation.id.clone(),
        name: rotation.notes.clone().unwrap_or_else(|| "Rotation".to_string()),
        simultaneous: rotation.simultaneous_stations,
        block_minutes: block_duration(&SessionBlock::Rotation(rotation.clone())),
        builder_minutes: builder_total(stations, rotation.simultaneous_stations),
        balanced: stations_balanced(stations),
        schedule: calculate_rotation(stations, &groups),
        matrix: generate_rotation_matrix(stations, &groups, &titles),
        findings: validate_rotation_block(rotation, &groups),
        assignments: assign_groups_to_stations(&groups, stations),
    };

    if changed {
        commit(&app, &mut state, next).await?;
        info!("🔁 Rotation {bid} updated ({station_count} stations)");
    }
    Ok(Json(view))
}

// ─── Metrics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct MetricsQuery {
    range: Option<MetricsRange>,
    /// End of the window; the server's local date when absent.
    today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub range: MetricsRange,
    pub from: NaiveDate,
    pub practice_count: usize,
    pub total_drill_minutes: u64,
    pub attendance: Vec<AttendanceRate>,
    pub categories: Vec<CategoryMinutes>,
}

async fn metrics(State(app): State<AppState>, Query(query): Query<MetricsQuery>) -> Json<MetricsReport> {
    let range = query.range.unwrap_or_default();
    let today = query.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    let state = app.planner.read().await;
    let practices = range.select(state.practices.values(), today);
    let categories = category_minutes(&practices, &state.catalog.drills);

    Json(MetricsReport {
        range,
        from: range.start(today),
        practice_count: practices.len(),
        total_drill_minutes: categories.iter().map(|c| u64::from(c.minutes)).sum(),
        attendance: attendance_rates(&state.players, &practices),
        categories,
    })
}
