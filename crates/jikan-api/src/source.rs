//! The seam between the catalogue and the remote catalogue service.
//!
//! [`JikanClient`](crate::JikanClient) is the production implementation;
//! tests substitute an in-memory source.

use std::future::Future;

use crate::error::ApiError;
use crate::filter::AnimeFilter;
use crate::types::{Anime, AnimePage, Genre};

/// Read-only access to an anime catalogue.
pub trait AnimeSource: Send + Sync {
    /// Genre choices for the filter UI.
    fn genres(&self) -> impl Future<Output = Result<Vec<Genre>, ApiError>> + Send;

    /// One page of the filtered listing.
    fn search_anime(
        &self,
        filter: &AnimeFilter,
    ) -> impl Future<Output = Result<AnimePage, ApiError>> + Send;

    /// Full record for one title. `id` is passed through opaquely.
    fn anime(&self, id: &str) -> impl Future<Output = Result<Anime, ApiError>> + Send;
}
