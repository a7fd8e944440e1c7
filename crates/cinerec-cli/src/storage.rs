//! `SQLite`-backed session storage.

use std::path::Path;

use anyhow::Result;
use cinerec_api::ClientError;
use cinerec_api::session::LocalStorage;
use cinerec_store::Connection;

/// Durable [`LocalStorage`] over the cinerec store.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the store in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            conn: cinerec_store::open_store(dir)?,
        })
    }
}

#[allow(clippy::needless_pass_by_value)]
fn storage_error(err: anyhow::Error) -> ClientError {
    ClientError::Storage(format!("{err:#}"))
}

impl LocalStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> cinerec_api::Result<Option<String>> {
        cinerec_store::get_item(&self.conn, key).map_err(storage_error)
    }

    fn set_item(&self, key: &str, value: &str) -> cinerec_api::Result<()> {
        cinerec_store::set_item(&self.conn, key, value).map_err(storage_error)
    }

    fn remove_item(&self, key: &str) -> cinerec_api::Result<()> {
        cinerec_store::remove_item(&self.conn, key)
            .map(|_| ())
            .map_err(storage_error)
    }
}
