//! Key/value accessors for the `settings` table

use crate::{Error, Result};
use sqlx::SqlitePool;

/// Read a single setting, `None` when the key is absent or NULL
pub async fn get_setting(db: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await
            .map_err(Error::Database)?;

    Ok(row.and_then(|(value,)| value))
}

/// Write several settings in one transaction (all or nothing)
pub async fn set_settings(db: &SqlitePool, entries: &[(&str, &str)]) -> Result<()> {
    let mut tx = db.begin().await?;

    for &(key, value) in entries {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Remove several settings in one transaction; missing keys are not an error
pub async fn delete_settings(db: &SqlitePool, keys: &[&str]) -> Result<()> {
    let mut tx = db.begin().await?;

    for &key in keys {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}
