use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Tenant;

const TENANT_COLUMNS: &str = "id, name, api_token, created_at";

pub fn insert_tenant(conn: &Connection, name: &str, api_token: &str) -> Result<Tenant> {
    let sql = format!(
        "INSERT INTO tenants (name, api_token, created_at) VALUES (?1, ?2, ?3) RETURNING {}",
        TENANT_COLUMNS
    );

    conn.query_row(&sql, params![name, api_token, Utc::now().naive_utc()], parse_tenant_row)
        .context("Failed to insert tenant")
}

fn parse_tenant_row(row: &rusqlite::Row) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        id: row.get(0)?,
        name: row.get(1)?,
        api_token: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn find_by_token(conn: &Connection, api_token: &str) -> Result<Option<Tenant>> {
    let sql = format!("SELECT {} FROM tenants WHERE api_token = ?1", TENANT_COLUMNS);

    conn.query_row(&sql, params![api_token], parse_tenant_row)
        .optional()
        .context("Failed to query tenant by token")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Tenant>> {
    let sql = format!("SELECT {} FROM tenants WHERE id = ?1", TENANT_COLUMNS);

    conn.query_row(&sql, params![id], parse_tenant_row)
        .optional()
        .context("Failed to query tenant by id")
}

pub fn list_all(conn: &Connection) -> Result<Vec<Tenant>> {
    let sql = format!("SELECT {} FROM tenants ORDER BY id", TENANT_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_tenant_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Deletes everything the tenant owns but keeps the tenant row and its token
pub fn purge_tenant_data(conn: &Connection, tenant_id: i64) -> Result<()> {
    for table in ["matches", "training_sessions", "bug_reports", "settings", "players"] {
        conn.execute(
            &format!("DELETE FROM {} WHERE tenant_id = ?1", table),
            params![tenant_id],
        )
        .with_context(|| format!("Failed to purge {} for tenant {}", table, tenant_id))?;
    }

    Ok(())
}
