use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{json_column, TenantSettings};

pub fn load(conn: &Connection, tenant_id: i64) -> Result<TenantSettings> {
    let settings: Option<TenantSettings> = conn
        .query_row(
            "SELECT data FROM settings WHERE tenant_id = ?1",
            params![tenant_id],
            |row| json_column(row, 0),
        )
        .optional()
        .context("Failed to load tenant settings")?;

    Ok(settings.unwrap_or_default())
}

pub fn save(conn: &Connection, tenant_id: i64, settings: &TenantSettings) -> Result<()> {
    let data = serde_json::to_string(settings).context("Failed to serialize tenant settings")?;

    conn.execute(
        "INSERT INTO settings (tenant_id, data, updated_at) VALUES (?1, ?2, ?3) \
         ON CONFLICT(tenant_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        params![tenant_id, data, Utc::now().naive_utc()],
    )
    .context("Failed to save tenant settings")?;

    Ok(())
}
