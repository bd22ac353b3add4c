use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::error::ApiError;
use super::handlers::AppState;
use crate::database::{self, tenants, Tenant};

/// Tenant resolved from `Authorization: Bearer <api token>`
#[derive(Debug, Clone)]
pub struct TenantAuth(pub Tenant);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for TenantAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let conn = database::get_connection(&state.pool)?;
        let tenant = tenants::find_by_token(&conn, token)?
            .ok_or_else(|| ApiError::Unauthorized("invalid api token".to_string()))?;

        Ok(TenantAuth(tenant))
    }
}
