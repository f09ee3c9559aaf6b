//! Price cache schema

use rusqlite::Connection;

/// SQL schema for the price cache database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS price_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Creates the cache tables if they do not exist
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
