//! View-state controllers.
//!
//! Controllers own loading/error/data state for a surface and are driven
//! by the front end; they never render.

mod detail;
mod list;

pub use detail::{DetailController, DetailState, MovieView, format_runtime, select_trailer};
pub use list::{
    FavoriteToggle, FetchOutcome, FetchTicket, ListController, ListSource, ListState, ListingItem,
};

/// Coarse status a renderer switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Nothing requested yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed.
    Error,
    /// Loaded with nothing to show.
    Empty,
    /// Loaded with content.
    Ready,
}
