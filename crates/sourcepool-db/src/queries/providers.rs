//! Provider settings queries.
//!
//! One row per registered provider holding its enable flag and priority key.
//! Priority moves are always applied to two rows at once inside a
//! transaction; no other row is touched.

use rusqlite::{params, Connection, OptionalExtension, Row};
use sourcepool_common::{Error, Result};

use crate::models::ProviderSetting;

fn row_to_setting(row: &Row<'_>) -> rusqlite::Result<ProviderSetting> {
    Ok(ProviderSetting {
        name: row.get(0)?,
        enabled: row.get::<_, i64>(1)? != 0,
        priority: row.get(2)?,
    })
}

/// Insert rows for providers that have never been seen before.
///
/// New providers are enabled and ranked below every existing one, in the
/// order given. Existing rows are left untouched. Returns how many rows were
/// inserted.
pub fn seed(conn: &Connection, names: &[&str]) -> Result<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut next_priority: i64 = tx
        .query_row("SELECT MIN(priority) FROM provider_settings", [], |row| {
            row.get::<_, Option<i64>>(0)
        })
        .map_err(|e| Error::database(e.to_string()))?
        .map(|min| min - 1)
        .unwrap_or(0);

    let mut inserted = 0;
    for name in names {
        let affected = tx
            .execute(
                "INSERT OR IGNORE INTO provider_settings (name, enabled, priority) VALUES (?1, 1, ?2)",
                params![name, next_priority],
            )
            .map_err(|e| Error::database(e.to_string()))?;
        if affected > 0 {
            inserted += 1;
            next_priority -= 1;
        }
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(inserted)
}

/// Get the settings row for one provider.
pub fn get(conn: &Connection, name: &str) -> Result<Option<ProviderSetting>> {
    conn.query_row(
        "SELECT name, enabled, priority FROM provider_settings WHERE name = ?1",
        params![name],
        row_to_setting,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List every settings row, highest priority first, ties by name.
pub fn list(conn: &Connection) -> Result<Vec<ProviderSetting>> {
    let mut stmt = conn
        .prepare(
            "SELECT name, enabled, priority FROM provider_settings
             ORDER BY priority DESC, name ASC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([], row_to_setting)
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Set the enable flag. Returns `false` when the provider has no row.
pub fn set_enabled(conn: &Connection, name: &str, enabled: bool) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE provider_settings SET enabled = ?2 WHERE name = ?1",
            params![name, enabled as i64],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Overwrite one provider's priority key.
pub fn set_priority(conn: &Connection, name: &str, priority: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE provider_settings SET priority = ?2 WHERE name = ?1",
            params![name, priority],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Add `delta` to `name`'s priority and subtract it from `other`'s.
///
/// Both rows must exist; otherwise nothing changes and `NotFound` is
/// returned.
pub fn shift_priority(conn: &Connection, name: &str, other: &str, delta: i64) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    for (target, amount) in [(name, delta), (other, -delta)] {
        let affected = tx
            .execute(
                "UPDATE provider_settings SET priority = priority + ?2 WHERE name = ?1",
                params![target, amount],
            )
            .map_err(|e| Error::database(e.to_string()))?;
        if affected == 0 {
            // Dropping the transaction rolls back the first update.
            return Err(Error::not_found(format!("provider '{}'", target)));
        }
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}
