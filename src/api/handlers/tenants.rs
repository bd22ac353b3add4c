use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use log::info;
use validator::Validate;

use super::AppState;
use crate::api::auth::TenantAuth;
use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::models::{CreateTenantRequest, TenantCreated};
use crate::database::{settings, tenants, Tenant, TenantSettings};
use crate::services::new_api_token;

pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateTenantRequest>,
) -> Result<(StatusCode, Json<TenantCreated>), ApiError> {
    request.validate()?;

    let mut conn = state.connection()?;
    let tx = conn.transaction()?;
    let api_token = new_api_token();
    let tenant = tenants::insert_tenant(&tx, request.name.trim(), &api_token)?;
    let defaults = TenantSettings {
        default_match: state.config.match_defaults.clone(),
        ..TenantSettings::default()
    };
    settings::save(&tx, tenant.id, &defaults)?;
    tx.commit()?;

    info!("Created tenant {} ({})", tenant.id, tenant.name);
    Ok((StatusCode::CREATED, Json(TenantCreated { tenant, api_token })))
}

pub async fn get_tenant(TenantAuth(tenant): TenantAuth) -> Json<Tenant> {
    Json(tenant)
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
) -> Result<Json<TenantSettings>, ApiError> {
    let conn = state.connection()?;
    Ok(Json(settings::load(&conn, tenant.id)?))
}

pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    TenantAuth(tenant): TenantAuth,
    ApiJson(document): ApiJson<TenantSettings>,
) -> Result<Json<TenantSettings>, ApiError> {
    document.validate()?;

    let conn = state.connection()?;
    settings::save(&conn, tenant.id, &document)?;
    info!("Updated settings for tenant {}", tenant.id);
    Ok(Json(document))
}
