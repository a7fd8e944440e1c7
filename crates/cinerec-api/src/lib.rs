//! Movie discovery client library for cinerec.
//!
//! Provides the session store, the backend client with its failure
//! policy, and the view-state controllers for listing and detail surfaces.

/// Strict backend API traits.
pub mod api;
/// HTTP client for the cinerec backend.
pub mod client;
/// Error taxonomy.
pub mod error;
/// Image CDN URLs.
pub mod images;
/// Listing query identities.
pub mod query;
/// Failure-policy layer over the backend API.
pub mod service;
/// Signed-in identity and credential persistence.
pub mod session;
/// Backend wire types.
pub mod types;
/// View-state controllers.
pub mod view;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{ClientError, Result};
