use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use super::models::AchievementRow;
use crate::scoring::PlayerId;

/// Stores the achievement once. Returns true when it was newly unlocked.
pub fn unlock(conn: &Connection, player_id: PlayerId, code: &str) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO achievements (player_id, code, unlocked_at) VALUES (?1, ?2, ?3)",
            params![player_id, code, Utc::now().naive_utc()],
        )
        .context("Failed to unlock achievement")?;

    Ok(inserted > 0)
}

pub fn list_by_player(conn: &Connection, player_id: PlayerId) -> Result<Vec<AchievementRow>> {
    let sql = "SELECT player_id, code, unlocked_at FROM achievements WHERE player_id = ?1 ORDER BY unlocked_at, code";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(AchievementRow {
                player_id: row.get(0)?,
                code: row.get(1)?,
                unlocked_at: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::open_memory, players, tenants};

    #[test]
    fn test_unlock_is_idempotent() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let player = players::insert_player(&conn, tenant.id, "A", None).unwrap();

        assert!(unlock(&conn, player.id, "first_180").unwrap());
        assert!(!unlock(&conn, player.id, "first_180").unwrap());
        assert!(unlock(&conn, player.id, "first_leg_won").unwrap());

        let codes: Vec<String> = list_by_player(&conn, player.id)
            .unwrap()
            .into_iter()
            .map(|a| a.code)
            .collect();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains(&"first_180".to_string()));
    }
}
