//! Detail coordinator: fetch and clear one title's full record.

use crate::store::{Action, AnimeState};
use jikan_api::{Anime, ApiError};
use tracing::{debug, info, warn};

/// An in-flight detail request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    /// Detail request counter at the time the fetch started
    pub request: u64,
    pub id: String,
}

/// Result of a detail fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Loaded,
    /// The API reported 404 for this id
    NotFound(String),
    Failed(String),
    /// Superseded by a newer fetch or by clear; the response was dropped
    Stale,
}

impl AnimeState {
    /// Start fetching a title; clears any previous record and error
    pub fn begin_detail(&mut self, id: &str) -> DetailRequest {
        self.reduce(Action::DetailStarted);
        info!(id = id, request = self.detail.request, "Fetching anime detail");
        DetailRequest {
            request: self.detail.request,
            id: id.to_string(),
        }
    }

    /// Apply the response for a request from [`AnimeState::begin_detail`]
    pub fn finish_detail(
        &mut self,
        request: DetailRequest,
        result: Result<Anime, ApiError>,
    ) -> DetailOutcome {
        if request.request != self.detail.request {
            debug!(
                id = %request.id,
                request = request.request,
                current = self.detail.request,
                "Discarding stale detail response"
            );
            return DetailOutcome::Stale;
        }

        match result {
            Ok(anime) => {
                debug!(id = %request.id, title = %anime.title, "Anime detail loaded");
                self.reduce(Action::DetailSucceeded { anime });
                DetailOutcome::Loaded
            }
            Err(e) => {
                let message = e.message();
                let not_found = e.is_not_found();
                warn!(id = %request.id, not_found, error = %message, "Anime detail failed");
                self.reduce(Action::DetailFailed {
                    message: message.clone(),
                    not_found,
                });
                if not_found {
                    DetailOutcome::NotFound(message)
                } else {
                    DetailOutcome::Failed(message)
                }
            }
        }
    }

    /// Reset the detail view; any fetch still in flight becomes stale
    pub fn clear_detail(&mut self) {
        self.reduce(Action::ClearDetail);
    }
}
