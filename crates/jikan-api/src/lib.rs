//! Jikan API v4 client for the anime catalogue.
//!
//! Provides the HTTP client, the response types, the listing filter and its
//! query-parameter mapping, and the [`AnimeSource`] trait the catalogue
//! coordinators are written against.

pub mod client;
pub mod error;
pub mod filter;
pub mod source;
pub mod types;

pub use client::JikanClient;
pub use error::ApiError;
pub use filter::{
    AnimeFilter, AnimeStatus, AnimeType, FilterPatch, OrderBy, Rating, SortDirection,
    DEFAULT_PAGE, PAGE_LIMIT,
};
pub use source::AnimeSource;
pub use types::*;
