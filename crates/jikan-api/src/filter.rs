//! Listing filter and its mapping to `/anime` query parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First page of any listing
pub const DEFAULT_PAGE: u32 = 1;

/// Items requested per listing page
pub const PAGE_LIMIT: u32 = 16;

/// Declares an enum whose variants map one-to-one to Jikan query values.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let choices: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} '{}', expected one of: {}", stringify!($name), s, choices.join(", "))
                    })
            }
        }
    };
}

wire_enum!(
    /// Media type
    AnimeType {
        Tv => "tv",
        Movie => "movie",
        Ova => "ova",
        Special => "special",
        Ona => "ona",
        Music => "music",
        Cm => "cm",
        Pv => "pv",
        TvSpecial => "tv_special",
    }
);

wire_enum!(
    /// Airing status
    AnimeStatus {
        Airing => "airing",
        Complete => "complete",
        Upcoming => "upcoming",
    }
);

wire_enum!(
    /// Audience rating
    Rating {
        G => "g",
        Pg => "pg",
        Pg13 => "pg13",
        R17 => "r17",
        R => "r",
        Rx => "rx",
    }
);

wire_enum!(
    /// Listing sort key
    OrderBy {
        MalId => "mal_id",
        Title => "title",
        StartDate => "start_date",
        EndDate => "end_date",
        Episodes => "episodes",
        Score => "score",
        ScoredBy => "scored_by",
        Rank => "rank",
        Popularity => "popularity",
        Members => "members",
        Favorites => "favorites",
    }
);

wire_enum!(
    /// Sort direction
    SortDirection {
        Asc => "asc",
        Desc => "desc",
    }
);

impl Rating {
    /// Human label for filter choices
    pub fn label(&self) -> &'static str {
        match self {
            Rating::G => "All Ages",
            Rating::Pg => "Children",
            Rating::Pg13 => "Teens 13 or older",
            Rating::R17 => "17+ (violence & profanity)",
            Rating::R => "Mild Nudity",
            Rating::Rx => "Hentai",
        }
    }
}

/// Search and filter criteria for the anime listing.
///
/// `genres` is a comma-separated list of genre ids. Empty strings and
/// unset fields are left out of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeFilter {
    pub page: u32,
    pub limit: u32,
    pub query: String,
    pub genres: String,
    #[serde(rename = "type")]
    pub anime_type: Option<AnimeType>,
    pub status: Option<AnimeStatus>,
    pub rating: Option<Rating>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub order_by: Option<OrderBy>,
    pub sort: Option<SortDirection>,
}

impl Default for AnimeFilter {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: PAGE_LIMIT,
            query: String::new(),
            genres: String::new(),
            anime_type: None,
            status: None,
            rating: Some(Rating::R17),
            start_date: None,
            end_date: None,
            order_by: Some(OrderBy::Popularity),
            sort: Some(SortDirection::Asc),
        }
    }
}

impl AnimeFilter {
    /// Same criteria positioned on another page
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Defaults for every field except the search text
    pub fn reset_keeping_query(&self) -> Self {
        Self {
            query: self.query.clone(),
            ..Self::default()
        }
    }

    /// Apply a partial update
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(page) = patch.page {
            self.page = page;
        }
        if let Some(limit) = patch.limit {
            self.limit = limit;
        }
        if let Some(query) = patch.query {
            self.query = query;
        }
        if let Some(genres) = patch.genres {
            self.genres = genres;
        }
        if let Some(anime_type) = patch.anime_type {
            self.anime_type = anime_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(order_by) = patch.order_by {
            self.order_by = order_by;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }
    }

    /// Query parameters for `GET /anime`, always including `sfw=true`
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        let query = self.query.trim();
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        if !self.genres.trim().is_empty() {
            params.push(("genres", self.genres.trim().to_string()));
        }
        if let Some(anime_type) = self.anime_type {
            params.push(("type", anime_type.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(rating) = self.rating {
            params.push(("rating", rating.to_string()));
        }
        if let Some(start_date) = self.start_date {
            params.push(("start_date", start_date.format("%Y-%m-%d").to_string()));
        }
        if let Some(end_date) = self.end_date {
            params.push(("end_date", end_date.format("%Y-%m-%d").to_string()));
        }
        if let Some(order_by) = self.order_by {
            params.push(("order_by", order_by.to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.to_string()));
        }

        params.push(("sfw", "true".to_string()));
        params
    }
}

/// Partial update of an [`AnimeFilter`].
///
/// `None` leaves a field alone; for nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub query: Option<String>,
    pub genres: Option<String>,
    pub anime_type: Option<Option<AnimeType>>,
    pub status: Option<Option<AnimeStatus>>,
    pub rating: Option<Option<Rating>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub order_by: Option<Option<OrderBy>>,
    pub sort: Option<Option<SortDirection>>,
}

impl FilterPatch {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold a later patch over this one; the later patch wins per field
    pub fn and(mut self, later: FilterPatch) -> Self {
        macro_rules! take {
            ($($field:ident),+) => {
                $(if later.$field.is_some() { self.$field = later.$field; })+
            };
        }
        take!(page, limit, query, genres, anime_type, status, rating, start_date, end_date, order_by, sort);
        self
    }
}
