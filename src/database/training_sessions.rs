use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{json_column, parsed_column, TrainingSessionRow};
use crate::scoring::{Dart, PlayerId};
use crate::training::TrainingState;

const SESSION_COLUMNS: &str = "id, tenant_id, player_id, mode, state, darts, score, hits, darts_thrown, hit_rate, started_at, completed_at";

pub fn insert_session(
    conn: &Connection,
    tenant_id: i64,
    player_id: PlayerId,
    state: &TrainingState,
) -> Result<TrainingSessionRow> {
    let state_json = serde_json::to_string(state).context("Failed to serialize training state")?;
    let sql = format!(
        "INSERT INTO training_sessions (tenant_id, player_id, mode, state, started_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
        SESSION_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            tenant_id,
            player_id,
            state.mode().as_str(),
            state_json,
            Utc::now().naive_utc()
        ],
        parse_session_row,
    )
    .context("Failed to insert training session")
}

fn parse_session_row(row: &rusqlite::Row) -> rusqlite::Result<TrainingSessionRow> {
    Ok(TrainingSessionRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        player_id: row.get(2)?,
        mode: parsed_column(row, 3, |s| s.parse().ok())?,
        state: json_column(row, 4)?,
        darts: json_column(row, 5)?,
        score: row.get(6)?,
        hits: row.get(7)?,
        darts_thrown: row.get(8)?,
        hit_rate: row.get(9)?,
        started_at: row.get(10)?,
        completed_at: row.get(11)?,
    })
}

/// Persists the drill after a visit. `completed_at` is stamped the first
/// time the state is terminal.
pub fn update_progress(
    conn: &Connection,
    id: i64,
    state: &TrainingState,
    darts: &[Dart],
) -> Result<TrainingSessionRow> {
    let state_json = serde_json::to_string(state).context("Failed to serialize training state")?;
    let darts_json = serde_json::to_string(darts).context("Failed to serialize training darts")?;
    let tally = state.tally();
    let completed_at = state.is_finished().then(|| Utc::now().naive_utc());
    let sql = format!(
        "UPDATE training_sessions SET state = ?1, darts = ?2, score = ?3, hits = ?4, darts_thrown = ?5, hit_rate = ?6, \
         completed_at = COALESCE(completed_at, ?7) WHERE id = ?8 RETURNING {}",
        SESSION_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            state_json,
            darts_json,
            state.score(),
            tally.hits,
            tally.darts_thrown,
            state.hit_rate(),
            completed_at,
            id
        ],
        parse_session_row,
    )
    .context("Failed to update training session")
}

pub fn find_by_id(conn: &Connection, tenant_id: i64, id: i64) -> Result<Option<TrainingSessionRow>> {
    let sql = format!(
        "SELECT {} FROM training_sessions WHERE id = ?1 AND tenant_id = ?2",
        SESSION_COLUMNS
    );

    conn.query_row(&sql, params![id, tenant_id], parse_session_row)
        .optional()
        .context("Failed to query training session by id")
}

/// Newest first, optionally narrowed to one player
pub fn list_by_tenant(
    conn: &Connection,
    tenant_id: i64,
    player_id: Option<PlayerId>,
) -> Result<Vec<TrainingSessionRow>> {
    let sql = format!(
        "SELECT {} FROM training_sessions WHERE tenant_id = ?1 AND (?2 IS NULL OR player_id = ?2) ORDER BY started_at DESC, id DESC",
        SESSION_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tenant_id, player_id], parse_session_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Oldest first
pub fn list_for_player(conn: &Connection, player_id: PlayerId) -> Result<Vec<TrainingSessionRow>> {
    let sql = format!(
        "SELECT {} FROM training_sessions WHERE player_id = ?1 ORDER BY id",
        SESSION_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], parse_session_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingSettings;
    use crate::database::{connection::open_memory, players, tenants};
    use crate::scoring::Visit;
    use crate::training::TrainingMode;

    #[test]
    fn test_progress_is_persisted() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let player = players::insert_player(&conn, tenant.id, "A", None).unwrap();

        let mut state = TrainingState::new(TrainingMode::Doubles, &TrainingSettings::default());
        let session = insert_session(&conn, tenant.id, player.id, &state).unwrap();
        assert_eq!(session.mode, TrainingMode::Doubles);
        assert!(!session.is_completed());

        let darts = vec![Dart::double(1), Dart::single(2), Dart::double(2)];
        state.apply_visit(&Visit::new(darts.clone()).unwrap()).unwrap();
        let updated = update_progress(&conn, session.id, &state, &darts).unwrap();

        assert_eq!(updated.score, 2);
        assert_eq!(updated.hits, 2);
        assert_eq!(updated.darts_thrown, 3);
        assert_eq!(updated.darts, darts);
        assert_eq!(updated.state, state);
        assert!(updated.completed_at.is_none());
    }

    #[test]
    fn test_list_filters_by_player() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = players::insert_player(&conn, tenant.id, "A", None).unwrap();
        let b = players::insert_player(&conn, tenant.id, "B", None).unwrap();
        let settings = TrainingSettings::default();

        insert_session(&conn, tenant.id, a.id, &TrainingState::new(TrainingMode::Bobs27, &settings)).unwrap();
        insert_session(&conn, tenant.id, b.id, &TrainingState::new(TrainingMode::Triples, &settings)).unwrap();

        assert_eq!(list_by_tenant(&conn, tenant.id, None).unwrap().len(), 2);
        let only_b = list_by_tenant(&conn, tenant.id, Some(b.id)).unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].mode, TrainingMode::Triples);
        assert_eq!(list_for_player(&conn, a.id).unwrap().len(), 1);
    }
}
