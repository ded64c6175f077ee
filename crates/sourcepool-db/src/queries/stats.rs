//! Provider try/success counter queries.
//!
//! Each update is a single statement, so concurrent dispatch tasks never lose
//! an increment. `mark_success` is guarded so a success can only be recorded
//! against an outstanding try.

use rusqlite::{params, Connection, OptionalExtension};
use sourcepool_common::{Error, Result};

use crate::models::ProviderStats;

/// Record one more try for `name`, creating the row on first use.
pub fn increment_try(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO provider_stats (name, try_count, success_count) VALUES (?1, 1, 0)
         ON CONFLICT(name) DO UPDATE SET try_count = try_count + 1",
        params![name],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Record a success for `name`.
///
/// Returns `false` without changing anything when there is no try left to
/// match it, which keeps `success_count <= try_count`.
pub fn mark_success(conn: &Connection, name: &str) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE provider_stats SET success_count = success_count + 1
             WHERE name = ?1 AND success_count < try_count",
            params![name],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Counters for one provider; zeros when it was never tried.
pub fn get(conn: &Connection, name: &str) -> Result<ProviderStats> {
    let stats = conn
        .query_row(
            "SELECT try_count, success_count FROM provider_stats WHERE name = ?1",
            params![name],
            |row| {
                Ok(ProviderStats {
                    try_count: row.get::<_, i64>(0)? as u64,
                    success_count: row.get::<_, i64>(1)? as u64,
                })
            },
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(stats.unwrap_or_default())
}

/// Counters for every provider that has been tried, ordered by name.
pub fn list(conn: &Connection) -> Result<Vec<(String, ProviderStats)>> {
    let mut stmt = conn
        .prepare("SELECT name, try_count, success_count FROM provider_stats ORDER BY name")
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ProviderStats {
                    try_count: row.get::<_, i64>(1)? as u64,
                    success_count: row.get::<_, i64>(2)? as u64,
                },
            ))
        })
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Zero every counter. Returns the number of providers reset.
pub fn reset_all(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM provider_stats", [])
        .map_err(|e| Error::database(e.to_string()))
}
