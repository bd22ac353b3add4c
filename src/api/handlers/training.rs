use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::AppState;
use crate::api::auth::TenantAuth;
use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::models::{StartTrainingRequest, TrainingListParams, TrainingVisitRequest};
use crate::database::training_sessions;
use crate::scoring::Visit;
use crate::services::training::{self as training_service, SessionView, TrainingVisitResponse};
use crate::training::TrainingMode;

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    Query(params): Query<TrainingListParams>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let conn = state.connection()?;
    let sessions = training_sessions::list_by_tenant(&conn, tenant.id, params.player_id)?
        .into_iter()
        .map(SessionView::from)
        .collect();
    Ok(Json(sessions))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiJson(request): ApiJson<StartTrainingRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    request.validate()?;
    let mode: TrainingMode = request.mode.parse()?;

    let conn = state.connection()?;
    let session = training_service::start_session(
        &conn,
        tenant.id,
        request.player_id,
        mode,
        &state.config.training,
    )?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(session_id): ApiPath<i64>,
) -> Result<Json<SessionView>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(training_service::load_session(&conn, tenant.id, session_id)?))
}

pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(session_id): ApiPath<i64>,
    ApiJson(request): ApiJson<TrainingVisitRequest>,
) -> Result<Json<TrainingVisitResponse>, ApiError> {
    request.validate()?;
    let visit = Visit::new(request.darts)?;

    let mut conn = state.connection()?;
    let response = training_service::record_visit(&mut conn, tenant.id, session_id, visit)?;
    Ok(Json(response))
}
