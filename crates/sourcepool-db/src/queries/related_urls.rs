//! Related URL queries.
//!
//! Maps `(video_type, title, year, season, episode, provider)` to the page on
//! that provider's site which holds the title, so repeated lookups can skip
//! the provider's search.

use rusqlite::{params, Connection, OptionalExtension};
use sourcepool_common::{Error, Result};

use crate::models::RelatedUrlKey;

/// Look up the cached URL for `key`.
pub fn get(conn: &Connection, key: &RelatedUrlKey) -> Result<Option<String>> {
    conn.query_row(
        "SELECT url FROM related_urls
         WHERE video_type = ?1 AND title = ?2 AND year = ?3
           AND season = ?4 AND episode = ?5 AND provider = ?6",
        params![
            key.video_type.as_str(),
            key.title,
            key.year_text(),
            key.season_text(),
            key.episode_text(),
            key.provider,
        ],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Store `url` for `key`, replacing any previous value.
pub fn set(conn: &Connection, key: &RelatedUrlKey, url: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO related_urls
            (video_type, title, year, season, episode, provider, url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            key.video_type.as_str(),
            key.title,
            key.year_text(),
            key.season_text(),
            key.episode_text(),
            key.provider,
            url,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Remove the mapping for `key`. Returns whether a row was deleted.
pub fn delete(conn: &Connection, key: &RelatedUrlKey) -> Result<bool> {
    let affected = conn
        .execute(
            "DELETE FROM related_urls
             WHERE video_type = ?1 AND title = ?2 AND year = ?3
               AND season = ?4 AND episode = ?5 AND provider = ?6",
            params![
                key.video_type.as_str(),
                key.title,
                key.year_text(),
                key.season_text(),
                key.episode_text(),
                key.provider,
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Remove every mapping held for one provider.
pub fn clear_provider(conn: &Connection, provider: &str) -> Result<usize> {
    conn.execute(
        "DELETE FROM related_urls WHERE provider = ?1",
        params![provider],
    )
    .map_err(|e| Error::database(e.to_string()))
}
