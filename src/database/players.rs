use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Player;
use crate::scoring::PlayerId;

const PLAYER_COLUMNS: &str = "id, tenant_id, name, avatar, created_at";

pub fn insert_player(
    conn: &Connection,
    tenant_id: i64,
    name: &str,
    avatar: Option<&str>,
) -> Result<Player> {
    let sql = format!(
        "INSERT INTO players (tenant_id, name, avatar, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
        PLAYER_COLUMNS
    );

    conn.query_row(
        &sql,
        params![tenant_id, name, avatar, Utc::now().naive_utc()],
        parse_player_row,
    )
    .context("Failed to insert new player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        avatar: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Player by id, only when it belongs to the tenant
pub fn find_by_id(conn: &Connection, tenant_id: i64, id: PlayerId) -> Result<Option<Player>> {
    let sql = format!(
        "SELECT {} FROM players WHERE id = ?1 AND tenant_id = ?2",
        PLAYER_COLUMNS
    );

    conn.query_row(&sql, params![id, tenant_id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn list_by_tenant(conn: &Connection, tenant_id: i64) -> Result<Vec<Player>> {
    let sql = format!(
        "SELECT {} FROM players WHERE tenant_id = ?1 ORDER BY name, id",
        PLAYER_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tenant_id], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = format!("SELECT {} FROM players ORDER BY id", PLAYER_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_player(
    conn: &Connection,
    tenant_id: i64,
    id: PlayerId,
    name: &str,
    avatar: Option<&str>,
) -> Result<Option<Player>> {
    let sql = format!(
        "UPDATE players SET name = ?1, avatar = ?2 WHERE id = ?3 AND tenant_id = ?4 RETURNING {}",
        PLAYER_COLUMNS
    );

    conn.query_row(&sql, params![name, avatar, id, tenant_id], parse_player_row)
        .optional()
        .context("Failed to update player")
}

/// Returns whether a row was deleted
pub fn delete_player(conn: &Connection, tenant_id: i64, id: PlayerId) -> Result<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM players WHERE id = ?1 AND tenant_id = ?2",
            params![id, tenant_id],
        )
        .context("Failed to delete player")?;

    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::open_memory, tenants};

    #[test]
    fn test_players_are_scoped_to_tenant() {
        let conn = open_memory();
        let home = tenants::insert_tenant(&conn, "home", "t1").unwrap();
        let away = tenants::insert_tenant(&conn, "away", "t2").unwrap();

        let player = insert_player(&conn, home.id, "Phil", None).unwrap();
        insert_player(&conn, away.id, "Michael", Some("mvg.png")).unwrap();

        assert!(find_by_id(&conn, home.id, player.id).unwrap().is_some());
        assert!(find_by_id(&conn, away.id, player.id).unwrap().is_none());
        assert_eq!(list_by_tenant(&conn, home.id).unwrap().len(), 1);
        assert_eq!(list_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_update_and_delete() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "home", "t1").unwrap();
        let player = insert_player(&conn, tenant.id, "Phil", None).unwrap();

        let renamed = update_player(&conn, tenant.id, player.id, "The Power", Some("p.png"))
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "The Power");
        assert_eq!(renamed.avatar.as_deref(), Some("p.png"));

        assert!(!delete_player(&conn, tenant.id + 1, player.id).unwrap());
        assert!(delete_player(&conn, tenant.id, player.id).unwrap());
        assert!(find_by_id(&conn, tenant.id, player.id).unwrap().is_none());
    }
}
