//! `localStorage`-style string values under fixed keys.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

/// Loads the value stored under `key`, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read item {key}"))
}

/// Stores `value` under `key`, replacing any previous value.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value],
    )
    .with_context(|| format!("failed to write item {key}"))?;
    tracing::trace!(%key, "Stored item");
    Ok(())
}

/// Removes the value stored under `key`. Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn remove_item(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM local_storage WHERE key = ?1", [key])
        .with_context(|| format!("failed to remove item {key}"))?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::connection::{open_in_memory, open_store};

    #[test]
    fn test_get_missing_item() {
        // Arrange
        let conn = open_in_memory().unwrap();

        // Act
        let value = get_item(&conn, "token").unwrap();

        // Assert
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get() {
        // Arrange
        let conn = open_in_memory().unwrap();

        // Act
        set_item(&conn, "token", "abc").unwrap();
        let value = get_item(&conn, "token").unwrap();

        // Assert
        assert_eq!(value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_set_replaces_existing() {
        // Arrange
        let conn = open_in_memory().unwrap();
        set_item(&conn, "token", "old").unwrap();

        // Act
        set_item(&conn, "token", "new").unwrap();
        let value = get_item(&conn, "token").unwrap();

        // Assert
        assert_eq!(value.as_deref(), Some("new"));
    }

    #[test]
    fn test_remove_item_is_idempotent() {
        // Arrange
        let conn = open_in_memory().unwrap();
        set_item(&conn, "token", "abc").unwrap();

        // Act
        let first = remove_item(&conn, "token").unwrap();
        let second = remove_item(&conn, "token").unwrap();

        // Assert
        assert!(first);
        assert!(!second);
        assert!(get_item(&conn, "token").unwrap().is_none());
    }

    #[test]
    fn test_value_survives_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        {
            let conn = open_store(dir.path()).unwrap();
            set_item(&conn, "token", "persisted").unwrap();
        }

        // Act
        let conn = open_store(dir.path()).unwrap();
        let value = get_item(&conn, "token").unwrap();

        // Assert
        assert_eq!(value.as_deref(), Some("persisted"));
    }
}
