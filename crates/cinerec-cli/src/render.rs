//! Plain-text listing renderers.
//!
//! Grid and carousel differ only in layout; both consume the same
//! [`ListingItem`] cards and favorited set.

use std::collections::HashSet;

use cinerec_api::types::MovieId;
use cinerec_api::view::{ListController, ListingItem, MovieView, RenderStatus};
use serde::{Deserialize, Serialize};

/// Cards per carousel page.
const CAROUSEL_PAGE: usize = 5;

/// History timestamps, e.g. `Mar 1, 2024 12:00`.
const VIEWED_AT_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Listing layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// One row per movie.
    #[default]
    Grid,
    /// Horizontal pages of cards.
    Carousel,
}

fn year(item: &ListingItem) -> String {
    item.release_year()
        .map_or_else(|| String::from("-"), |y| y.to_string())
}

fn score(item: &ListingItem) -> String {
    match (&item.viewed_at, item.vote_average) {
        (Some(viewed), _) => item.viewed_at_time().map_or_else(
            || viewed.clone(),
            |time| time.format(VIEWED_AT_FORMAT).to_string(),
        ),
        (None, Some(vote)) => format!("{vote:.1}"),
        (None, None) => String::from("-"),
    }
}

fn grid(title: &str, items: &[ListingItem], favorited: &HashSet<MovieId>) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len().saturating_add(3));
    lines.push(format!("== {title} =="));
    lines.push(String::from("ID\tYear\tScore\tFav\tTitle"));
    for item in items {
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}",
            item.movie_id,
            year(item),
            score(item),
            if favorited.contains(&item.movie_id) { "*" } else { "" },
            item.title,
        ));
    }
    lines.push(format!("Total: {} movies", items.len()));
    lines
}

fn carousel(title: &str, items: &[ListingItem], favorited: &HashSet<MovieId>) -> Vec<String> {
    let pages = items.len().div_ceil(CAROUSEL_PAGE);
    let mut lines = vec![format!("== {title} ==")];
    for (page, chunk) in items.chunks(CAROUSEL_PAGE).enumerate() {
        let cards: Vec<String> = chunk
            .iter()
            .map(|item| {
                let heart = if favorited.contains(&item.movie_id) { " *" } else { "" };
                format!("{} ({}){heart}", item.title, year(item))
            })
            .collect();
        lines.push(format!(
            "[{}/{pages}] < {} >",
            page.saturating_add(1),
            cards.join(" | ")
        ));
    }
    lines
}

/// Renders cards in the chosen layout.
#[must_use]
pub fn render_items(
    kind: RendererKind,
    title: &str,
    items: &[ListingItem],
    favorited: &HashSet<MovieId>,
) -> Vec<String> {
    if items.is_empty() {
        return vec![format!("== {title} =="), String::from("No movies found")];
    }
    match kind {
        RendererKind::Grid => grid(title, items, favorited),
        RendererKind::Carousel => carousel(title, items, favorited),
    }
}

/// Renders a listing controller according to its status.
#[must_use]
pub fn render_listing(kind: RendererKind, title: &str, controller: &ListController) -> Vec<String> {
    match controller.status() {
        RenderStatus::Idle => Vec::new(),
        RenderStatus::Loading => vec![String::from("Loading...")],
        RenderStatus::Error => vec![format!(
            "Error: {}",
            controller.error().unwrap_or("unknown error")
        )],
        RenderStatus::Empty | RenderStatus::Ready => {
            render_items(kind, title, controller.items(), controller.favorited())
        }
    }
}

/// Renders the detail surface.
#[must_use]
pub fn render_detail(view: &MovieView, region: &str) -> Vec<String> {
    let detail = &view.detail;
    let mut lines = Vec::new();
    let year = detail
        .release_year()
        .map_or_else(String::new, |y| format!(" ({y})"));
    let heart = if view.is_favorite { " *" } else { "" };
    lines.push(format!("{}{year}{heart}", detail.title));
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("\"{tagline}\""));
    }
    lines.push(format!(
        "Rating: {:.1}  Runtime: {}  Language: {}",
        detail.vote_average,
        view.runtime_label().unwrap_or_else(|| String::from("-")),
        detail
            .original_language
            .as_deref()
            .map_or_else(|| String::from("-"), str::to_uppercase),
    ));
    let genres = view.genre_line();
    if !genres.is_empty() {
        lines.push(format!("Genres: {genres}"));
    }
    if let Some(overview) = detail.overview.as_deref().filter(|o| !o.is_empty()) {
        lines.push(format!("Overview: {overview}"));
    }
    let cast: Vec<String> = view
        .top_cast()
        .iter()
        .map(|c| match c.character.as_deref() {
            Some(role) if !role.is_empty() => format!("{} as {role}", c.name),
            _ => c.name.clone(),
        })
        .collect();
    if !cast.is_empty() {
        lines.push(format!("Cast: {}", cast.join(", ")));
    }
    if let Some(block) = view.providers_in(region) {
        for (label, providers) in [
            ("Stream", &block.flatrate),
            ("Rent", &block.rent),
            ("Buy", &block.buy),
        ] {
            if !providers.is_empty() {
                let names: Vec<&str> = providers.iter().map(|p| p.provider_name.as_str()).collect();
                lines.push(format!("{label} ({region}): {}", names.join(", ")));
            }
        }
    }
    if let Some(url) = view.trailer().and_then(cinerec_api::types::Video::youtube_url) {
        lines.push(format!("Trailer: {url}"));
    }
    lines.push(format!("Poster: {}", view.poster_url()));
    lines
}
