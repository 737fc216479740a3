//! Key-value rows in `kv_store`. Values are opaque text; callers own the format.

use rusqlite::{params, Connection};

use super::DatabaseError;

/// Get a value by key. Returns None if not set.
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
    match stmt.query_row([key], |row| row.get::<_, String>(0)) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Set a value (upsert).
pub fn set_value(conn: &Connection, key: &str, value: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

/// Delete a value. Returns whether a row was removed.
pub fn delete_value(conn: &Connection, key: &str) -> Result<bool, DatabaseError> {
    let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
    Ok(removed > 0)
}

/// Keys starting with `prefix`, sorted.
pub fn keys_with_prefix(conn: &Connection, prefix: &str) -> Result<Vec<String>, DatabaseError> {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let mut stmt =
        conn.prepare("SELECT key FROM kv_store WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key")?;
    let keys = stmt
        .query_map([format!("{escaped}%")], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys)
}
