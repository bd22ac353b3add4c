use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{matches, misc, players, tenants, training, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(misc::health))
        .route("/api/tenants", post(tenants::create_tenant))
        .route("/api/tenant", get(tenants::get_tenant))
        .route(
            "/api/settings",
            get(tenants::get_settings).put(tenants::put_settings),
        )
        .route(
            "/api/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/api/players/:id",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::delete_player),
        )
        .route("/api/players/:id/stats", get(players::get_player_stats))
        .route(
            "/api/players/:id/stats/recompute",
            post(players::recompute_player_stats),
        )
        .route("/api/players/:id/heatmap", get(players::get_heatmap))
        .route(
            "/api/players/:id/heatmap/regenerate",
            post(players::regenerate_player_heatmap),
        )
        .route(
            "/api/players/:id/achievements",
            get(players::list_achievements),
        )
        .route(
            "/api/matches",
            get(matches::list_matches).post(matches::create_match),
        )
        .route("/api/matches/:id", get(matches::get_match))
        .route("/api/matches/:id/throws", post(matches::record_throw))
        .route("/api/legs/:id/throws", get(matches::list_leg_throws))
        .route(
            "/api/training-sessions",
            get(training::list_sessions).post(training::start_session),
        )
        .route("/api/training-sessions/:id", get(training::get_session))
        .route(
            "/api/training-sessions/:id/visits",
            post(training::record_visit),
        )
        .route("/api/checkout/:score", get(misc::get_checkout))
        .route(
            "/api/bug-reports",
            get(misc::list_bug_reports).post(misc::create_bug_report),
        )
        .with_state(state)
}
