use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use log::info;
use validator::Validate;

use super::AppState;
use crate::api::auth::TenantAuth;
use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::models::{BugReportRequest, CheckoutResponse, HealthResponse};
use crate::database::{bug_reports, settings, BugReport};
use crate::scoring::{is_finishable, suggest_checkout, Dart};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Route for the tenant's default out rule
pub async fn get_checkout(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiPath(score): ApiPath<u32>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let conn = state.connection()?;
    let double_out = settings::load(&conn, tenant.id)?.default_match.double_out;

    Ok(Json(CheckoutResponse {
        score,
        finishable: is_finishable(score, double_out),
        route: suggest_checkout(score, double_out)
            .map(|route| route.iter().map(Dart::label).collect()),
    }))
}

pub async fn list_bug_reports(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
) -> Result<Json<Vec<BugReport>>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(bug_reports::list_by_tenant(&conn, tenant.id)?))
}

pub async fn create_bug_report(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiJson(request): ApiJson<BugReportRequest>,
) -> Result<(StatusCode, Json<BugReport>), ApiError> {
    request.validate()?;

    let conn = state.connection()?;
    let report =
        bug_reports::insert_bug_report(&conn, tenant.id, request.title.trim(), request.description.trim())?;
    info!("Tenant {} filed bug report {}", tenant.id, report.id);
    Ok((StatusCode::CREATED, Json(report)))
}
