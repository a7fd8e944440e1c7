//! Session store: the signed-in identity and its bearer credential.
//!
//! The store is the only writer of the session. Readers (the backend
//! client, guarded commands) receive a [`SessionHandle`] at construction.

mod storage;
mod store;
mod validation;

pub use storage::{LocalStorage, MemoryStorage, SESSION_KEY};
#[allow(clippy::module_name_repetitions)]
pub use store::{Session, SessionHandle, SessionStore};
pub use validation::{MIN_PASSWORD_LEN, validate_signup};
