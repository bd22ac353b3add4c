use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use super::models::BugReport;

const BUG_REPORT_COLUMNS: &str = "id, tenant_id, title, description, status, created_at";

pub fn insert_bug_report(
    conn: &Connection,
    tenant_id: i64,
    title: &str,
    description: &str,
) -> Result<BugReport> {
    let sql = format!(
        "INSERT INTO bug_reports (tenant_id, title, description, status, created_at) VALUES (?1, ?2, ?3, 'open', ?4) RETURNING {}",
        BUG_REPORT_COLUMNS
    );

    conn.query_row(
        &sql,
        params![tenant_id, title, description, Utc::now().naive_utc()],
        parse_bug_report_row,
    )
    .context("Failed to insert bug report")
}

fn parse_bug_report_row(row: &rusqlite::Row) -> rusqlite::Result<BugReport> {
    Ok(BugReport {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn list_by_tenant(conn: &Connection, tenant_id: i64) -> Result<Vec<BugReport>> {
    let sql = format!(
        "SELECT {} FROM bug_reports WHERE tenant_id = ?1 ORDER BY id DESC",
        BUG_REPORT_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tenant_id], parse_bug_report_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::open_memory, tenants};

    #[test]
    fn test_reports_listed_newest_first() {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        insert_bug_report(&conn, tenant.id, "Crash", "On undo").unwrap();
        insert_bug_report(&conn, tenant.id, "Typo", "Settings page").unwrap();

        let reports = list_by_tenant(&conn, tenant.id).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].title, "Typo");
        assert_eq!(reports[1].status, "open");
        assert!(list_by_tenant(&conn, tenant.id + 1).unwrap().is_empty());
    }
}
