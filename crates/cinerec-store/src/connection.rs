//! Store connection management.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name inside the store directory.
const STORE_FILE: &str = "cinerec.db";

/// Opens (or creates) `{dir}/cinerec.db` and brings its schema up to date.
///
/// The directory is created when missing.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created, or a
/// migration fails.
pub fn open_store(dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let path = dir.join(STORE_FILE);
    let conn = Connection::open(&path)
        .with_context(|| format!("failed to open store {}", path.display()))?;

    run_migrations(&conn).context("store migration failed")?;
    tracing::debug!(path = %path.display(), "Store opened");

    Ok(conn)
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory store")?;
    run_migrations(&conn).context("store migration failed")?;
    Ok(conn)
}
