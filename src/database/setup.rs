use anyhow::{Context, Result};
use rusqlite::Connection;

/// Child tables first so the drops never trip a foreign key
const TABLES: [&str; 12] = [
    "achievements",
    "throws",
    "legs",
    "match_players",
    "matches",
    "training_sessions",
    "heatmap_data",
    "player_stats",
    "players",
    "settings",
    "bug_reports",
    "tenants",
];

pub fn initialize_database(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    let statements = split_sql_statements(schema_sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    log::debug!("Applied {} schema statements", statements.len());
    Ok(())
}

pub fn reset_database(conn: &Connection) -> Result<()> {
    for table in TABLES {
        execute_sql(conn, &format!("DROP TABLE IF EXISTS {}", table))
            .with_context(|| format!("Failed to drop table {}", table))?;
    }

    initialize_database(conn)?;
    log::info!("Database schema reset successfully");
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        initialize_database(&conn).unwrap();
        assert_eq!(table_count(&conn), TABLES.len() as i64);
    }

    #[test]
    fn test_reset_drops_rows() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        conn.execute(
            "INSERT INTO tenants (name, api_token, created_at) VALUES ('club', 'tok', CURRENT_TIMESTAMP)",
            [],
        )
        .unwrap();

        reset_database(&conn).unwrap();

        let tenants: i64 = conn
            .query_row("SELECT COUNT(*) FROM tenants", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tenants, 0);
        assert_eq!(table_count(&conn), TABLES.len() as i64);
    }

    #[test]
    fn test_split_ignores_trailing_whitespace() {
        let statements = split_sql_statements("CREATE TABLE a (x); \n CREATE TABLE b (y)\n");
        assert_eq!(statements.len(), 2);
    }
}
