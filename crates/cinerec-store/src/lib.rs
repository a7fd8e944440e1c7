//! Durable key/value storage for cinerec.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep small string values under
//! fixed keys across process restarts, such as the signed-in session.

mod connection;
/// Key/value CRUD operations.
pub mod kv;
mod migrations;

pub use connection::open_store;
pub use kv::{get_item, remove_item, set_item};
pub use rusqlite::Connection;
