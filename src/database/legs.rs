use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::LegRow;
use crate::scoring::{LegSummary, PlayerId};

const LEG_COLUMNS: &str =
    "id, match_id, set_number, leg_number, starting_player_id, winner_id, created_at, completed_at";

pub fn insert_leg(
    conn: &Connection,
    match_id: i64,
    set_number: u32,
    leg_number: u32,
    starting_player_id: PlayerId,
) -> Result<LegRow> {
    let sql = format!(
        "INSERT INTO legs (match_id, set_number, leg_number, starting_player_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
        LEG_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            match_id,
            set_number,
            leg_number,
            starting_player_id,
            Utc::now().naive_utc()
        ],
        parse_leg_row,
    )
    .context("Failed to insert leg")
}

fn parse_leg_row(row: &rusqlite::Row) -> rusqlite::Result<LegRow> {
    Ok(LegRow {
        id: row.get(0)?,
        match_id: row.get(1)?,
        set_number: row.get(2)?,
        leg_number: row.get(3)?,
        starting_player_id: row.get(4)?,
        winner_id: row.get(5)?,
        created_at: row.get(6)?,
        completed_at: row.get(7)?,
    })
}

/// Leg by id, only when its match belongs to the tenant
pub fn find_by_id(conn: &Connection, tenant_id: i64, id: i64) -> Result<Option<LegRow>> {
    let sql = format!(
        "SELECT {} FROM legs WHERE id = ?1 AND match_id IN (SELECT id FROM matches WHERE tenant_id = ?2)",
        LEG_COLUMNS
    );

    conn.query_row(&sql, params![id, tenant_id], parse_leg_row)
        .optional()
        .context("Failed to query leg by id")
}

/// Legs of a match in play order
pub fn list_by_match(conn: &Connection, match_id: i64) -> Result<Vec<LegRow>> {
    let sql = format!(
        "SELECT {} FROM legs WHERE match_id = ?1 ORDER BY leg_number",
        LEG_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![match_id], parse_leg_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// The leg still being played, if any
pub fn current_leg(conn: &Connection, match_id: i64) -> Result<Option<LegRow>> {
    let sql = format!(
        "SELECT {} FROM legs WHERE match_id = ?1 AND winner_id IS NULL ORDER BY leg_number DESC LIMIT 1",
        LEG_COLUMNS
    );

    conn.query_row(&sql, params![match_id], parse_leg_row)
        .optional()
        .context("Failed to query current leg")
}

/// Sets the winner. A leg that already has one is left untouched and
/// false is returned.
pub fn set_winner(conn: &Connection, id: i64, winner_id: PlayerId) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE legs SET winner_id = ?1, completed_at = ?2 WHERE id = ?3 AND winner_id IS NULL",
            params![winner_id, Utc::now().naive_utc(), id],
        )
        .context("Failed to set leg winner")?;

    Ok(updated > 0)
}

pub fn summaries(legs: &[LegRow]) -> Vec<LegSummary> {
    legs.iter()
        .map(|leg| LegSummary {
            set_number: leg.set_number,
            leg_number: leg.leg_number,
            winner_id: leg.winner_id,
        })
        .collect()
}
