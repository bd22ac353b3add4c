use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use super::models::{json_column, ThrowRow};
use crate::scoring::{Dart, PlayerId, Visit, VisitRecord};

const THROW_COLUMNS: &str = "id, leg_id, player_id, visit_number, darts, score, remaining_before, remaining_after, is_bust, is_checkout, checkout_attempt, darts_thrown, average, created_at";

pub fn insert_throw(conn: &Connection, leg_id: i64, record: &VisitRecord) -> Result<ThrowRow> {
    let outcome = &record.outcome;
    let darts_json = serde_json::to_string(&outcome.darts).context("Failed to serialize darts")?;
    let sql = format!(
        "INSERT INTO throws (leg_id, player_id, visit_number, darts, score, remaining_before, remaining_after, is_bust, is_checkout, checkout_attempt, darts_thrown, average, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) RETURNING {}",
        THROW_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            leg_id,
            record.player_id,
            record.visit_number,
            darts_json,
            outcome.visit_sum,
            outcome.remaining_before,
            outcome.remaining_after,
            outcome.is_bust(),
            outcome.is_checkout(),
            record.checkout_attempt,
            record.darts_thrown,
            record.average,
            Utc::now().naive_utc()
        ],
        parse_throw_row,
    )
    .context("Failed to insert throw")
}

fn parse_throw_row(row: &rusqlite::Row) -> rusqlite::Result<ThrowRow> {
    Ok(ThrowRow {
        id: row.get(0)?,
        leg_id: row.get(1)?,
        player_id: row.get(2)?,
        visit_number: row.get(3)?,
        darts: json_column(row, 4)?,
        score: row.get(5)?,
        remaining_before: row.get(6)?,
        remaining_after: row.get(7)?,
        is_bust: row.get(8)?,
        is_checkout: row.get(9)?,
        checkout_attempt: row.get(10)?,
        darts_thrown: row.get(11)?,
        average: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Throws of a leg in visit order
pub fn list_by_leg(conn: &Connection, leg_id: i64) -> Result<Vec<ThrowRow>> {
    let sql = format!(
        "SELECT {} FROM throws WHERE leg_id = ?1 ORDER BY visit_number",
        THROW_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![leg_id], parse_throw_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Every match dart the player has thrown
pub fn list_darts_for_player(conn: &Connection, player_id: PlayerId) -> Result<Vec<Dart>> {
    let sql = "SELECT darts FROM throws WHERE player_id = ?1 ORDER BY leg_id, visit_number";

    let mut stmt = conn.prepare(sql)?;
    let visits = stmt
        .query_map(params![player_id], |row| json_column::<Vec<Dart>>(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(visits.into_iter().flatten().collect())
}

/// Stored throws as replayable visits
pub fn to_visits(rows: &[ThrowRow]) -> Result<Vec<(PlayerId, Visit)>> {
    rows.iter()
        .map(|row| {
            let visit = Visit::new(row.darts.clone())
                .with_context(|| format!("Stored throw {} is not a valid visit", row.id))?;
            Ok((row.player_id, visit))
        })
        .collect()
}
