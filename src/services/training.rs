use anyhow::Result;
use log::{debug, info};
use rusqlite::Connection;
use serde::Serialize;

use super::stats::refresh_achievements;
use super::ServiceError;
use crate::config::TrainingSettings;
use crate::database::{heatmaps, player_stats, players, training_sessions, TrainingSessionRow};
use crate::scoring::{PlayerId, Visit};
use crate::stats::Achievement;
use crate::training::{TrainingError, TrainingMode, TrainingState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub session: TrainingSessionRow,
    pub current_target: Option<String>,
    pub finished: bool,
}

impl From<TrainingSessionRow> for SessionView {
    fn from(session: TrainingSessionRow) -> Self {
        Self {
            current_target: session.state.current_target(),
            finished: session.state.is_finished(),
            session,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingVisitResponse {
    pub session: SessionView,
    pub unlocked_achievements: Vec<Achievement>,
}

pub fn start_session(
    conn: &Connection,
    tenant_id: i64,
    player_id: PlayerId,
    mode: TrainingMode,
    settings: &TrainingSettings,
) -> Result<SessionView> {
    if players::find_by_id(conn, tenant_id, player_id)?.is_none() {
        return Err(ServiceError::NotFound(format!("player {}", player_id)).into());
    }

    let state = TrainingState::new(mode, settings);
    let session = training_sessions::insert_session(conn, tenant_id, player_id, &state)?;
    info!("Player {} started {} session {}", player_id, mode, session.id);
    Ok(session.into())
}

pub fn load_session(conn: &Connection, tenant_id: i64, session_id: i64) -> Result<SessionView> {
    training_sessions::find_by_id(conn, tenant_id, session_id)?
        .map(SessionView::from)
        .ok_or_else(|| ServiceError::NotFound(format!("training session {}", session_id)).into())
}

/// Applies one visit to a drill and persists progress, the heatmap and,
/// once the drill ends, the player's completed-session count
pub fn record_visit(
    conn: &mut Connection,
    tenant_id: i64,
    session_id: i64,
    visit: Visit,
) -> Result<TrainingVisitResponse> {
    let tx = conn.transaction()?;

    let session = training_sessions::find_by_id(&tx, tenant_id, session_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("training session {}", session_id)))?;
    if session.is_completed() {
        return Err(TrainingError::Finished.into());
    }

    let player_id = session.player_id;
    let mut state = session.state;
    state.apply_visit(&visit)?;

    let mut darts = session.darts;
    darts.extend_from_slice(visit.darts());
    let updated = training_sessions::update_progress(&tx, session_id, &state, &darts)?;
    debug!(
        "Session {} ({}): score {}, hit rate {:.1}%",
        session_id,
        state.mode(),
        state.score(),
        state.hit_rate()
    );

    let mut heatmap = heatmaps::load(&tx, player_id)?;
    heatmap.record_all(visit.darts());
    heatmaps::save(&tx, player_id, &heatmap)?;

    let mut unlocked_achievements = Vec::new();
    if state.is_finished() {
        let mut stats = player_stats::load(&tx, player_id)?;
        stats.record_training_completed();
        player_stats::save(&tx, player_id, &stats)?;
        unlocked_achievements = refresh_achievements(&tx, player_id, &stats)?;
        info!(
            "Session {} finished with score {} ({} darts)",
            session_id,
            state.score(),
            state.tally().darts_thrown
        );
    }

    tx.commit()?;

    Ok(TrainingVisitResponse {
        session: updated.into(),
        unlocked_achievements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::open_memory;
    use crate::database::tenants;
    use crate::scoring::Dart;

    fn setup() -> (Connection, i64, PlayerId) {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let player = players::insert_player(&conn, tenant.id, "A", None).unwrap();
        (conn, tenant.id, player.id)
    }

    #[test]
    fn test_drill_finishes_and_counts() {
        let (mut conn, tenant_id, player_id) = setup();
        let settings = TrainingSettings {
            score_training_rounds: 2,
            ..TrainingSettings::default()
        };
        let session =
            start_session(&conn, tenant_id, player_id, TrainingMode::ScoreTraining, &settings).unwrap();
        assert_eq!(session.current_target.as_deref(), Some("20"));
        let id = session.session.id;

        let first = record_visit(&mut conn, tenant_id, id, Visit::new(vec![Dart::treble(20); 3]).unwrap()).unwrap();
        assert!(!first.session.finished);

        let second = record_visit(&mut conn, tenant_id, id, Visit::new(vec![Dart::single(20); 3]).unwrap()).unwrap();
        assert!(second.session.finished);
        assert_eq!(second.session.session.score, 240);
        assert!(second.session.session.completed_at.is_some());
        assert_eq!(second.session.session.darts.len(), 6);

        let err = record_visit(&mut conn, tenant_id, id, Visit::new(vec![Dart::miss()]).unwrap()).unwrap_err();
        assert_eq!(err.downcast::<TrainingError>().unwrap(), TrainingError::Finished);

        let stats = player_stats::load(&conn, player_id).unwrap();
        assert_eq!(stats.training_sessions_completed, 1);
        assert_eq!(heatmaps::load(&conn, player_id).unwrap().total_darts, 6);
    }

    #[test]
    fn test_sessions_are_tenant_scoped() {
        let (conn, tenant_id, player_id) = setup();
        let session = start_session(
            &conn,
            tenant_id,
            player_id,
            TrainingMode::Doubles,
            &TrainingSettings::default(),
        )
        .unwrap();

        assert!(load_session(&conn, tenant_id, session.session.id).is_ok());
        assert!(load_session(&conn, tenant_id + 1, session.session.id).is_err());
        assert!(start_session(
            &conn,
            tenant_id + 1,
            player_id,
            TrainingMode::Doubles,
            &TrainingSettings::default()
        )
        .is_err());
    }
}
