//! Plain-text rendering of the listing and detail views.

use crate::scroll::Viewport;
use crate::store::{DetailState, ListState};
use jikan_api::{Anime, AnimeFilter, Genre, MalEntity};
use std::fmt::Write;

/// One listing row
pub fn render_row(index: usize, anime: &Anime) -> String {
    let mut row = format!("{:>4}. [{}] {}", index + 1, anime.mal_id, anime.title);

    let mut meta = Vec::new();
    if let Some(kind) = &anime.anime_type {
        meta.push(kind.clone());
    }
    if let Some(year) = anime.year {
        meta.push(year.to_string());
    }
    if let Some(episodes) = anime.episodes {
        meta.push(format!("{} ep", episodes));
    }
    if !meta.is_empty() {
        let _ = write!(row, " ({})", meta.join(", "));
    }
    if let Some(score) = anime.score {
        let _ = write!(row, " score {:.2}", score);
    }
    row
}

/// The listing: loading and error banners, rows (windowed when a viewport is
/// given) and a pagination footer
pub fn render_list(list: &ListState, viewport: Option<&Viewport>) -> String {
    let mut out = String::new();

    if let Some(error) = &list.error {
        let _ = writeln!(out, "Error: {}", error);
    }

    if list.loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }

    if list.data.is_empty() {
        let _ = writeln!(out, "No anime found!");
        return out;
    }

    let len = list.data.len();
    let (start, end) = match viewport {
        Some(viewport) => (viewport.top.min(len), viewport.end(len)),
        None => (0, len),
    };
    for (index, anime) in list.data.iter().enumerate().take(end).skip(start) {
        let _ = writeln!(out, "{}", render_row(index, anime));
    }

    if list.is_loading_more {
        let _ = writeln!(out, "Loading more...");
    }

    let pagination = &list.pagination;
    let _ = write!(
        out,
        "-- rows {}-{} of {} loaded, page {}/{}",
        start + 1,
        end,
        len,
        pagination.current_page,
        pagination.last_visible_page.max(pagination.current_page)
    );
    if pagination.items.total > 0 {
        let _ = write!(out, ", {} total", pagination.items.total);
    }
    let _ = writeln!(
        out,
        "{}",
        if pagination.has_next_page {
            ", more available --"
        } else {
            ", end of list --"
        }
    );

    out
}

fn names(entities: &[MalEntity]) -> String {
    entities
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}

/// The detail view.
///
/// A 404 is shown as "not found", distinct from other failures; an error
/// always takes precedence over any record.
pub fn render_detail(detail: &DetailState) -> String {
    let mut out = String::new();

    if detail.loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }

    if let Some(error) = &detail.error {
        if detail.not_found {
            let _ = writeln!(out, "Not found: {}", error);
        } else {
            let _ = writeln!(out, "Error: {}", error);
        }
        return out;
    }

    let Some(anime) = &detail.anime else {
        let _ = writeln!(out, "Something went wrong!");
        return out;
    };

    let _ = writeln!(out, "{}", anime.display_title());
    if let Some(japanese) = anime.title_japanese.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "{}", japanese);
    }
    let _ = writeln!(
        out,
        "Score: {}  Rank: #{}  Popularity: #{}",
        anime
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "N/A".to_string()),
        or_unknown(anime.rank),
        or_unknown(anime.popularity)
    );

    let tags: Vec<&str> = anime.tags().map(|t| t.name.as_str()).collect();
    if !tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", tags.join(", "));
    }
    if let Some(image) = anime.images.jpg.image_url.as_deref().filter(|u| !u.is_empty()) {
        let _ = writeln!(out, "Image: {}", image);
    }
    if let Some(trailer) = anime.trailer_url() {
        let _ = writeln!(out, "Trailer: {}", trailer);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Type: {}", or_unknown(anime.anime_type.as_deref()));
    let _ = writeln!(out, "Episodes: {}", or_unknown(anime.episodes));
    let _ = writeln!(out, "Status: {}", or_unknown(anime.status.as_deref()));
    let _ = writeln!(out, "Duration: {}", or_unknown(anime.duration.as_deref()));
    let _ = writeln!(out, "Rating: {}", or_unknown(anime.rating.as_deref()));
    let _ = writeln!(out, "Source: {}", or_unknown(anime.source.as_deref()));
    if anime.season.is_some() || anime.year.is_some() {
        let _ = writeln!(
            out,
            "Season: {} {}",
            anime.season.as_deref().unwrap_or(""),
            anime.year.map(|y| y.to_string()).unwrap_or_default()
        );
    }
    if let Some(broadcast) = &anime.broadcast {
        if let Some(day) = &broadcast.day {
            let _ = writeln!(
                out,
                "Broadcast: {}, {} ({})",
                day,
                broadcast.time.as_deref().unwrap_or("?"),
                broadcast.timezone.as_deref().unwrap_or("?")
            );
        }
    }

    for (label, entities) in [
        ("Studios", &anime.studios),
        ("Producers", &anime.producers),
        ("Licensors", &anime.licensors),
    ] {
        if !entities.is_empty() {
            let _ = writeln!(out, "{}: {}", label, names(entities));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Synopsis");
    let _ = writeln!(
        out,
        "{}",
        anime
            .synopsis
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("No synopsis available.")
    );
    if let Some(background) = anime.background.as_deref().filter(|b| !b.is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Background");
        let _ = writeln!(out, "{}", background);
    }

    out
}

pub fn render_genres(genres: &[Genre]) -> String {
    if genres.is_empty() {
        return "No genres loaded\n".to_string();
    }
    let mut out = String::new();
    for genre in genres {
        let _ = writeln!(out, "{:>4}  {} ({})", genre.mal_id, genre.name, genre.count);
    }
    out
}

/// Filters as `field=value` pairs; unset fields are left out
pub fn render_filters(filter: &AnimeFilter) -> String {
    let pairs: Vec<String> = filter
        .to_query()
        .into_iter()
        .filter(|(key, _)| !matches!(*key, "page" | "limit" | "sfw"))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    if pairs.is_empty() {
        "(no filters)".to_string()
    } else {
        pairs.join(" ")
    }
}
