//! Jikan API v4 response types.
//!
//! List items and detail records share the [`Anime`] shape. Listing
//! responses may leave most fields empty, so everything except `mal_id`
//! tolerates being absent or null.

use serde::{Deserialize, Serialize};

/// Generic pagination wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Simple data wrapper (without pagination)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Single resource wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub data: T,
}

/// One page of the anime listing
pub type AnimePage = PaginatedResponse<Anime>;

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub last_visible_page: u32,
    pub has_next_page: bool,
    pub current_page: u32,
    pub items: PaginationItems,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationItems {
    pub count: u32,
    pub total: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            last_visible_page: 1,
            has_next_page: false,
            current_page: 1,
            items: PaginationItems {
                count: 0,
                total: 0,
                per_page: 8,
            },
        }
    }
}

/// Genre entry from `/genres/anime`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub mal_id: u32,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub count: u32,
}

/// Anime record, used for both list items and the detail view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub mal_id: u32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: AnimeImages,
    #[serde(default)]
    pub trailer: Option<Trailer>,

    // Titles
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,

    // Type and status
    #[serde(default, rename = "type")]
    pub anime_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,

    // Scores and rankings
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub members: Option<u32>,

    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub background: Option<String>,

    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub broadcast: Option<Broadcast>,

    #[serde(default)]
    pub studios: Vec<MalEntity>,
    #[serde(default)]
    pub producers: Vec<MalEntity>,
    #[serde(default)]
    pub licensors: Vec<MalEntity>,

    #[serde(default)]
    pub genres: Vec<MalEntity>,
    #[serde(default)]
    pub themes: Vec<MalEntity>,
    #[serde(default)]
    pub demographics: Vec<MalEntity>,
}

impl Anime {
    /// English title when the API has one, otherwise the default title
    pub fn display_title(&self) -> &str {
        match self.title_english.as_deref() {
            Some(english) if !english.trim().is_empty() => english,
            _ => &self.title,
        }
    }

    /// Genres, themes and demographics in display order
    pub fn tags(&self) -> impl Iterator<Item = &MalEntity> {
        self.genres
            .iter()
            .chain(self.themes.iter())
            .chain(self.demographics.iter())
    }

    /// Trailer link, preferring the watch URL over the embed URL
    pub fn trailer_url(&self) -> Option<&str> {
        let trailer = self.trailer.as_ref()?;
        trailer.url.as_deref().or(trailer.embed_url.as_deref())
    }
}

/// Anime images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeImages {
    #[serde(default)]
    pub jpg: ImageSet,
    #[serde(default)]
    pub webp: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    pub image_url: Option<String>,
    #[serde(default)]
    pub small_image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Trailer links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    pub youtube_id: Option<String>,
    pub url: Option<String>,
    pub embed_url: Option<String>,
}

/// Broadcast information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    pub day: Option<String>,
    pub time: Option<String>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
}

/// MAL entity (genre, studio, producer, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalEntity {
    pub mal_id: u32,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Error body returned by Jikan for non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JikanErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
