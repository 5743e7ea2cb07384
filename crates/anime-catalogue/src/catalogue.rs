//! Catalogue orchestrator.
//!
//! Owns the [`AnimeState`] and an [`AnimeSource`], and runs each operation
//! to completion: dispatch pending, await the source, apply the response.

use crate::detail::DetailOutcome;
use crate::draft::FilterDraft;
use crate::list::{ListRequest, LoadOutcome};
use crate::store::{Action, AnimeState};
use jikan_api::{AnimeSource, FilterPatch, Genre};
use tracing::{info, warn};

/// State container bound to a catalogue source
pub struct Catalogue<S> {
    source: S,
    state: AnimeState,
    genres: Vec<Genre>,
}

impl<S: AnimeSource> Catalogue<S> {
    /// Create a catalogue with default filters
    pub fn new(source: S, page_limit: u32) -> Self {
        Self {
            source,
            state: AnimeState::new(page_limit),
            genres: Vec::new(),
        }
    }

    pub fn state(&self) -> &AnimeState {
        &self.state
    }

    /// Direct access for callers that split operations across tasks
    pub fn state_mut(&mut self) -> &mut AnimeState {
        &mut self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Genre choices, empty until [`Catalogue::load_genres`] succeeds
    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn set_genres(&mut self, genres: Vec<Genre>) {
        self.genres = genres;
    }

    /// Fetch the genre list; failures are logged and leave it unchanged
    pub async fn load_genres(&mut self) -> &[Genre] {
        match self.source.genres().await {
            Ok(genres) => {
                info!(count = genres.len(), "Genres loaded");
                self.genres = genres;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load genres");
            }
        }
        &self.genres
    }

    /// Reload page 1 under the current filters
    pub async fn load_initial(&mut self) -> LoadOutcome {
        let request = self.state.begin_initial_load();
        self.run_list_request(request).await
    }

    async fn run_list_request(&mut self, request: ListRequest) -> LoadOutcome {
        let result = self.source.search_anime(&request.filter).await;
        self.state.finish_list_request(request, result)
    }

    /// Append the next page, if there is one and nothing is loading
    pub async fn load_more(&mut self) -> LoadOutcome {
        let Some(request) = self.state.begin_load_more() else {
            return LoadOutcome::Skipped;
        };
        self.run_list_request(request).await
    }

    /// Fetch one title for the detail view
    pub async fn fetch_detail(&mut self, id: &str) -> DetailOutcome {
        let request = self.state.begin_detail(id);
        let result = self.source.anime(&request.id).await;
        self.state.finish_detail(request, result)
    }

    /// Tear down the detail view
    pub fn clear_detail(&mut self) {
        self.state.clear_detail();
    }

    /// Merge a partial update into the applied filters without reloading
    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.state.reduce(Action::SetFilters(patch));
    }

    /// Commit search text (already debounced) and start a page 1 reload
    pub fn begin_search(&mut self, patch: FilterPatch) -> ListRequest {
        self.set_filters(patch);
        self.state.begin_initial_load()
    }

    /// Merge a confirmed draft and start a reload
    pub fn begin_apply_draft(&mut self, draft: FilterDraft) -> ListRequest {
        self.set_filters(draft.into_patch());
        self.state.begin_initial_load()
    }

    /// Restore default filters (keeping the search text) and start a reload
    pub fn begin_reset_filters(&mut self) -> ListRequest {
        self.state.reduce(Action::ResetFilters);
        self.state.begin_initial_load()
    }

    /// Start a draft on top of the applied filters
    pub fn open_draft(&self) -> FilterDraft {
        FilterDraft::open(&self.state.list.filters)
    }

    pub async fn search(&mut self, patch: FilterPatch) -> LoadOutcome {
        let request = self.begin_search(patch);
        self.run_list_request(request).await
    }

    pub async fn apply_draft(&mut self, draft: FilterDraft) -> LoadOutcome {
        let request = self.begin_apply_draft(draft);
        self.run_list_request(request).await
    }

    pub async fn reset_filters(&mut self) -> LoadOutcome {
        let request = self.begin_reset_filters();
        self.run_list_request(request).await
    }
}
