use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::json_column;
use crate::scoring::PlayerId;
use crate::stats::Heatmap;

pub fn load(conn: &Connection, player_id: PlayerId) -> Result<Heatmap> {
    let heatmap: Option<Heatmap> = conn
        .query_row(
            "SELECT data FROM heatmap_data WHERE player_id = ?1",
            params![player_id],
            |row| json_column(row, 0),
        )
        .optional()
        .context("Failed to load heatmap")?;

    Ok(heatmap.unwrap_or_default())
}

pub fn save(conn: &Connection, player_id: PlayerId, heatmap: &Heatmap) -> Result<()> {
    let data = serde_json::to_string(heatmap).context("Failed to serialize heatmap")?;

    conn.execute(
        "INSERT INTO heatmap_data (player_id, data, total_darts, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(player_id) DO UPDATE SET data = excluded.data, total_darts = excluded.total_darts, updated_at = excluded.updated_at",
        params![player_id, data, heatmap.total_darts, Utc::now().naive_utc()],
    )
    .context("Failed to save heatmap")?;

    Ok(())
}
