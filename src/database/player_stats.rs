use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::json_column;
use crate::scoring::PlayerId;
use crate::stats::PlayerStats;

/// Stored statistics, or zeroed ones when the player has none yet
pub fn load(conn: &Connection, player_id: PlayerId) -> Result<PlayerStats> {
    let stats: Option<PlayerStats> = conn
        .query_row(
            "SELECT data FROM player_stats WHERE player_id = ?1",
            params![player_id],
            |row| json_column(row, 0),
        )
        .optional()
        .context("Failed to load player stats")?;

    Ok(stats.unwrap_or_default())
}

pub fn save(conn: &Connection, player_id: PlayerId, stats: &PlayerStats) -> Result<()> {
    let data = serde_json::to_string(stats).context("Failed to serialize player stats")?;

    conn.execute(
        "INSERT INTO player_stats (player_id, data, total_180s, average, updated_at) VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(player_id) DO UPDATE SET data = excluded.data, total_180s = excluded.total_180s, average = excluded.average, updated_at = excluded.updated_at",
        params![
            player_id,
            data,
            stats.total_180s,
            stats.average(),
            Utc::now().naive_utc()
        ],
    )
    .context("Failed to save player stats")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::open_memory, players, tenants};

    #[test]
    fn test_missing_stats_are_zeroed_then_saved() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let player = players::insert_player(&conn, tenant.id, "A", None).unwrap();

        assert_eq!(load(&conn, player.id).unwrap(), PlayerStats::default());

        let stats = PlayerStats {
            total_180s: 2,
            total_points: 360,
            total_darts: 6,
            ..PlayerStats::default()
        };
        save(&conn, player.id, &stats).unwrap();
        save(&conn, player.id, &stats).unwrap();
        assert_eq!(load(&conn, player.id).unwrap(), stats);

        let average: f64 = conn
            .query_row(
                "SELECT average FROM player_stats WHERE player_id = ?1",
                params![player.id],
                |row| row.get(0),
            )
            .unwrap();
        assert!((average - 180.0).abs() < f64::EPSILON);
    }
}
