//! Jikan API client.
//!
//! Plain request/response: no rate limiting and no retries. Failures are
//! returned as [`ApiError`] for the caller to surface.

use crate::error::ApiError;
use crate::filter::AnimeFilter;
use crate::source::AnimeSource;
use crate::types::*;
use anyhow::{bail, Context, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Jikan API v4 client
#[derive(Debug, Clone)]
pub struct JikanClient {
    /// HTTP client
    client: Client,
    /// Base URL for Jikan API, e.g. `https://api.jikan.moe/v4`
    base_url: Url,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Jikan base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            bail!("Jikan base URL must be an http(s) URL: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Build an endpoint URL from path segments; segments are percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Make a GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(url = %url, params = ?query, "Making API request");

        let response = match self.client.get(url.clone()).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Request error");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_response(status, &body);
            warn!(url = %url, status = %status, error = %err, "Request failed");
            return Err(err);
        }

        match response.json::<T>().await {
            Ok(data) => {
                debug!(url = %url, "Request successful");
                Ok(data)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to parse response");
                Err(ApiError::Parse(e.to_string()))
            }
        }
    }

    /// Fetch the anime genre list
    pub async fn get_genres(&self) -> Result<Vec<Genre>, ApiError> {
        info!("Fetching anime genres");
        let response: DataResponse<Genre> = self
            .get(&["genres", "anime"], &[("filter", "genres".to_string())])
            .await?;
        Ok(response.data)
    }

    /// Fetch one page of the filtered anime listing
    pub async fn get_anime_page(&self, filter: &AnimeFilter) -> Result<AnimePage, ApiError> {
        info!(
            page = filter.page,
            limit = filter.limit,
            query = %filter.query,
            "Fetching anime listing"
        );
        self.get(&["anime"], &filter.to_query()).await
    }

    /// Fetch full anime details by id
    pub async fn get_anime_details(&self, id: &str) -> Result<Anime, ApiError> {
        debug!(id = id, "Fetching anime details");
        let response: ItemResponse<Anime> = self.get(&["anime", id.trim()], &[]).await?;
        Ok(response.data)
    }
}

impl AnimeSource for JikanClient {
    async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        self.get_genres().await
    }

    async fn search_anime(&self, filter: &AnimeFilter) -> Result<AnimePage, ApiError> {
        self.get_anime_page(filter).await
    }

    async fn anime(&self, id: &str) -> Result<Anime, ApiError> {
        self.get_anime_details(id).await
    }
}
