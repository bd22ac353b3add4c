use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{json_column, parsed_column, MatchPlayer, MatchRow};
use crate::scoring::{MatchSettings, MatchStatus, PlayerId};

const MATCH_COLUMNS: &str =
    "id, tenant_id, game_type, status, settings, winner_id, created_at, completed_at";

pub fn insert_match(conn: &Connection, tenant_id: i64, settings: &MatchSettings) -> Result<MatchRow> {
    let settings_json = serde_json::to_string(settings).context("Failed to serialize match settings")?;
    let sql = format!(
        "INSERT INTO matches (tenant_id, game_type, status, settings, created_at) VALUES (?1, 'x01', ?2, ?3, ?4) RETURNING {}",
        MATCH_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            tenant_id,
            MatchStatus::InProgress.as_str(),
            settings_json,
            Utc::now().naive_utc()
        ],
        parse_match_row,
    )
    .context("Failed to insert match")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRow> {
    Ok(MatchRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        game_type: row.get(2)?,
        status: parsed_column(row, 3, MatchStatus::parse)?,
        settings: json_column(row, 4)?,
        winner_id: row.get(5)?,
        created_at: row.get(6)?,
        completed_at: row.get(7)?,
    })
}

pub fn add_match_player(
    conn: &Connection,
    match_id: i64,
    player_id: PlayerId,
    position: u32,
) -> Result<()> {
    conn.execute(
        "INSERT INTO match_players (match_id, player_id, position) VALUES (?1, ?2, ?3)",
        params![match_id, player_id, position],
    )
    .context("Failed to add player to match")?;

    Ok(())
}

/// Players of a match in rotation order
pub fn list_match_players(conn: &Connection, match_id: i64) -> Result<Vec<MatchPlayer>> {
    let sql = "SELECT match_id, player_id, position FROM match_players WHERE match_id = ?1 ORDER BY position";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![match_id], |row| {
            Ok(MatchPlayer {
                match_id: row.get(0)?,
                player_id: row.get(1)?,
                position: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn rotation(conn: &Connection, match_id: i64) -> Result<Vec<PlayerId>> {
    Ok(list_match_players(conn, match_id)?
        .into_iter()
        .map(|p| p.player_id)
        .collect())
}

pub fn find_by_id(conn: &Connection, tenant_id: i64, id: i64) -> Result<Option<MatchRow>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE id = ?1 AND tenant_id = ?2",
        MATCH_COLUMNS
    );

    conn.query_row(&sql, params![id, tenant_id], parse_match_row)
        .optional()
        .context("Failed to query match by id")
}

/// Newest first
pub fn list_by_tenant(conn: &Connection, tenant_id: i64) -> Result<Vec<MatchRow>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE tenant_id = ?1 ORDER BY created_at DESC, id DESC",
        MATCH_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tenant_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Every match the player took part in, oldest first
pub fn list_for_player(conn: &Connection, player_id: PlayerId) -> Result<Vec<MatchRow>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE id IN (SELECT match_id FROM match_players WHERE player_id = ?1) ORDER BY id",
        MATCH_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Number of matches the player is on the roster of
pub fn count_for_player(conn: &Connection, player_id: PlayerId) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM match_players WHERE player_id = ?1",
        params![player_id],
        |row| row.get(0),
    )
    .context("Failed to count matches for player")
}

/// Marks the match completed. Returns false if it already was.
pub fn complete_match(conn: &Connection, id: i64, winner_id: PlayerId) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE matches SET status = ?1, winner_id = ?2, completed_at = ?3 WHERE id = ?4 AND status = ?5",
            params![
                MatchStatus::Completed.as_str(),
                winner_id,
                Utc::now().naive_utc(),
                id,
                MatchStatus::InProgress.as_str()
            ],
        )
        .context("Failed to complete match")?;

    Ok(updated > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::open_memory, players, tenants};

    #[test]
    fn test_match_round_trip_with_rotation() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = players::insert_player(&conn, tenant.id, "A", None).unwrap();
        let b = players::insert_player(&conn, tenant.id, "B", None).unwrap();

        let settings = MatchSettings {
            starting_score: 301,
            ..MatchSettings::default()
        };
        let created = insert_match(&conn, tenant.id, &settings).unwrap();
        add_match_player(&conn, created.id, b.id, 0).unwrap();
        add_match_player(&conn, created.id, a.id, 1).unwrap();

        let loaded = find_by_id(&conn, tenant.id, created.id).unwrap().unwrap();
        assert_eq!(loaded.settings, settings);
        assert_eq!(loaded.status, MatchStatus::InProgress);
        assert_eq!(loaded.game_type, "x01");
        assert_eq!(rotation(&conn, created.id).unwrap(), vec![b.id, a.id]);
        assert_eq!(list_for_player(&conn, a.id).unwrap().len(), 1);
        assert_eq!(count_for_player(&conn, a.id).unwrap(), 1);
        assert!(find_by_id(&conn, tenant.id + 1, created.id).unwrap().is_none());
    }

    #[test]
    fn test_complete_only_once() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = players::insert_player(&conn, tenant.id, "A", None).unwrap();
        let created = insert_match(&conn, tenant.id, &MatchSettings::default()).unwrap();
        add_match_player(&conn, created.id, a.id, 0).unwrap();

        assert!(complete_match(&conn, created.id, a.id).unwrap());
        assert!(!complete_match(&conn, created.id, a.id).unwrap());

        let loaded = find_by_id(&conn, tenant.id, created.id).unwrap().unwrap();
        assert_eq!(loaded.status, MatchStatus::Completed);
        assert_eq!(loaded.winner_id, Some(a.id));
        assert!(loaded.completed_at.is_some());
    }
}
