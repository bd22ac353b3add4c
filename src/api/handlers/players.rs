use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use log::info;
use rusqlite::Connection;
use validator::Validate;

use super::AppState;
use crate::api::auth::TenantAuth;
use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::models::{AchievementView, PlayerRequest, PlayerStatsResponse};
use crate::database::{achievements, heatmaps, player_stats, players, Player};
use crate::scoring::PlayerId;
use crate::services::players as player_service;
use crate::services::stats::{rebuild_player_stats, regenerate_heatmap};
use crate::stats::Heatmap;

pub(super) fn require_player(
    conn: &Connection,
    tenant_id: i64,
    player_id: PlayerId,
) -> Result<Player, ApiError> {
    players::find_by_id(conn, tenant_id, player_id)?
        .ok_or_else(|| ApiError::NotFound(format!("player {} not found", player_id)))
}

pub async fn list_players(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
) -> Result<Json<Vec<Player>>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(players::list_by_tenant(&conn, tenant.id)?))
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiJson(request): ApiJson<PlayerRequest>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    request.validate()?;

    let mut conn = state.connection()?;
    let player = player_service::create_player(
        &mut conn,
        tenant.id,
        request.name.trim(),
        request.avatar.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<Json<Player>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(require_player(&conn, tenant.id, player_id)?))
}

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
    ApiJson(request): ApiJson<PlayerRequest>,
) -> Result<Json<Player>, ApiError> {
    request.validate()?;

    let conn = state.connection()?;
    players::update_player(
        &conn,
        tenant.id,
        player_id,
        request.name.trim(),
        request.avatar.as_deref(),
    )?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("player {} not found", player_id)))
}

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<StatusCode, ApiError> {
    let conn = state.connection()?;
    player_service::delete_player(&conn, tenant.id, player_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_player_stats(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<Json<PlayerStatsResponse>, ApiError> {
    let conn = state.connection()?;
    require_player(&conn, tenant.id, player_id)?;
    let stats = player_stats::load(&conn, player_id)?;
    Ok(Json(PlayerStatsResponse::new(player_id, stats)))
}

pub async fn recompute_player_stats(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<Json<PlayerStatsResponse>, ApiError> {
    let mut conn = state.connection()?;
    require_player(&conn, tenant.id, player_id)?;

    let tx = conn.transaction()?;
    let stats = rebuild_player_stats(&tx, player_id)?;
    tx.commit()?;

    info!("Recomputed statistics for player {}", player_id);
    Ok(Json(PlayerStatsResponse::new(player_id, stats)))
}

pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<Json<Heatmap>, ApiError> {
    let conn = state.connection()?;
    require_player(&conn, tenant.id, player_id)?;
    Ok(Json(heatmaps::load(&conn, player_id)?))
}

pub async fn regenerate_player_heatmap(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<Json<Heatmap>, ApiError> {
    let conn = state.connection()?;
    require_player(&conn, tenant.id, player_id)?;
    Ok(Json(regenerate_heatmap(&conn, player_id)?))
}

pub async fn list_achievements(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(player_id): ApiPath<PlayerId>,
) -> Result<Json<Vec<AchievementView>>, ApiError> {
    let conn = state.connection()?;
    require_player(&conn, tenant.id, player_id)?;
    let unlocked = achievements::list_by_player(&conn, player_id)?
        .into_iter()
        .map(AchievementView::from)
        .collect();
    Ok(Json(unlocked))
}
