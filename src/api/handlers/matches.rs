use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::AppState;
use crate::api::auth::TenantAuth;
use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::models::{CreateMatchRequest, ThrowRequest};
use crate::database::{legs, matches, settings, throws, MatchRow, ThrowRow};
use crate::services::matches::{self as match_service, MatchView, VisitResponse};

pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
) -> Result<Json<Vec<MatchRow>>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(matches::list_by_tenant(&conn, tenant.id)?))
}

pub async fn create_match(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiJson(request): ApiJson<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchView>), ApiError> {
    request.validate()?;

    let mut conn = state.connection()?;
    let match_settings = match request.settings {
        Some(explicit) => explicit,
        None => settings::load(&conn, tenant.id)?.default_match,
    };
    let view = match_service::create_match(&mut conn, tenant.id, &request.player_ids, match_settings)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_match(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(match_id): ApiPath<i64>,
) -> Result<Json<MatchView>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(match_service::load_match_view(&conn, tenant.id, match_id)?))
}

pub async fn record_throw(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(match_id): ApiPath<i64>,
    ApiJson(request): ApiJson<ThrowRequest>,
) -> Result<(StatusCode, Json<VisitResponse>), ApiError> {
    request.validate()?;
    let visit = request.visit()?;

    let mut conn = state.connection()?;
    let response =
        match_service::record_visit(&mut conn, tenant.id, match_id, request.player_id, visit)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_leg_throws(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(leg_id): ApiPath<i64>,
) -> Result<Json<Vec<ThrowRow>>, ApiError> {
    let conn = state.connection()?;
    let leg = legs::find_by_id(&conn, tenant.id, leg_id)?
        .ok_or_else(|| ApiError::NotFound(format!("leg {} not found", leg_id)))?;
    Ok(Json(throws::list_by_leg(&conn, leg.id)?))
}
