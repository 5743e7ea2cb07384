//! List coordinator: initial load and load more.
//!
//! Both operations are split into a synchronous `begin_*` step that
//! dispatches the pending action and hands back a [`ListRequest`], and a
//! synchronous [`AnimeState::finish_list_request`] step that applies the
//! response. The network call happens in between, so the caller decides
//! whether to await it inline or on a spawned task.

use crate::store::{Action, AnimeState};
use jikan_api::{AnimeFilter, AnimePage, ApiError, DEFAULT_PAGE};
use tracing::{debug, info, warn};

/// Which list operation a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRequestKind {
    Initial,
    More,
}

/// An in-flight listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub kind: ListRequestKind,
    /// List generation the request was issued under
    pub generation: u64,
    /// Exact filter sent to the API
    pub filter: AnimeFilter,
}

/// Result of a list operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was applied; `added` new titles were kept
    Loaded { added: usize },
    /// Preconditions were not met, nothing was requested
    Skipped,
    /// The request failed; the message is now in `list.error`
    Failed(String),
    /// A newer initial load superseded this request; the response was dropped
    Stale,
}

impl AnimeState {
    /// Start an initial load: page 1 under the current filters
    pub fn begin_initial_load(&mut self) -> ListRequest {
        let filter = AnimeFilter {
            page: DEFAULT_PAGE,
            limit: self.list.page_limit,
            ..self.list.filters.clone()
        };

        self.reduce(Action::InitialLoadStarted);

        info!(
            generation = self.list.generation,
            query = %filter.query,
            "Starting initial load"
        );

        ListRequest {
            kind: ListRequestKind::Initial,
            generation: self.list.generation,
            filter,
        }
    }

    /// Start loading the next page.
    ///
    /// Returns `None` without touching state when there is no next page or a
    /// load is already in progress.
    pub fn begin_load_more(&mut self) -> Option<ListRequest> {
        if !self.list.can_load_more() {
            debug!(
                has_next_page = self.list.pagination.has_next_page,
                loading = self.list.loading,
                is_loading_more = self.list.is_loading_more,
                "Load more skipped"
            );
            return None;
        }

        let next_page = self.list.pagination.current_page + 1;
        let filter = AnimeFilter {
            page: next_page,
            limit: self.list.page_limit,
            ..self.list.filters.clone()
        };

        self.reduce(Action::LoadMoreStarted);

        info!(
            generation = self.list.generation,
            page = next_page,
            "Loading more anime"
        );

        Some(ListRequest {
            kind: ListRequestKind::More,
            generation: self.list.generation,
            filter,
        })
    }

    /// Apply the response of a request started by one of the `begin_*` calls
    pub fn finish_list_request(
        &mut self,
        request: ListRequest,
        result: Result<AnimePage, ApiError>,
    ) -> LoadOutcome {
        if request.generation != self.list.generation {
            debug!(
                request_generation = request.generation,
                current_generation = self.list.generation,
                kind = ?request.kind,
                "Discarding stale list response"
            );
            return LoadOutcome::Stale;
        }

        match (request.kind, result) {
            (ListRequestKind::Initial, Ok(page)) => {
                self.reduce(Action::InitialLoadSucceeded {
                    filter: request.filter,
                    page,
                });
                info!(
                    items = self.list.data.len(),
                    has_next_page = self.list.pagination.has_next_page,
                    "Initial load complete"
                );
                LoadOutcome::Loaded {
                    added: self.list.data.len(),
                }
            }
            (ListRequestKind::More, Ok(page)) => {
                let before = self.list.data.len();
                self.reduce(Action::LoadMoreSucceeded {
                    page_number: request.filter.page,
                    page,
                });
                let added = self.list.data.len() - before;
                info!(
                    page = request.filter.page,
                    added = added,
                    total = self.list.data.len(),
                    "Load more complete"
                );
                LoadOutcome::Loaded { added }
            }
            (kind, Err(e)) => {
                let message = e.message();
                warn!(kind = ?kind, error = %message, "List request failed");
                let action = match kind {
                    ListRequestKind::Initial => Action::InitialLoadFailed {
                        message: message.clone(),
                    },
                    ListRequestKind::More => Action::LoadMoreFailed {
                        message: message.clone(),
                    },
                };
                self.reduce(action);
                LoadOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jikan_api::{Anime, Pagination};

    fn anime(mal_id: u32, title: &str) -> Anime {
        Anime {
            mal_id,
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn page(items: Vec<Anime>, current_page: u32, has_next_page: bool) -> AnimePage {
        AnimePage {
            data: items,
            pagination: Pagination {
                current_page,
                has_next_page,
                ..Default::default()
            },
        }
    }

    fn ids(state: &AnimeState) -> Vec<u32> {
        state.list.data.iter().map(|a| a.mal_id).collect()
    }

    #[test]
    fn test_initial_load_request_resets_page() {
        let mut state = AnimeState::default();
        state.list.filters.page = 5;
        state.list.filters.limit = 3;
        state.list.filters.query = "naruto".to_string();

        let request = state.begin_initial_load();
        assert_eq!(request.kind, ListRequestKind::Initial);
        assert_eq!(request.filter.page, 1);
        assert_eq!(request.filter.limit, 16);
        assert_eq!(request.filter.query, "naruto");
        assert!(state.list.loading);
    }

    #[test]
    fn test_initial_load_success_scenario() {
        let mut state = AnimeState::default();
        let request = state.begin_initial_load();
        let filter = request.filter.clone();

        let outcome = state.finish_list_request(
            request,
            Ok(page(vec![anime(1, "Naruto")], 1, false)),
        );

        assert_eq!(outcome, LoadOutcome::Loaded { added: 1 });
        assert_eq!(ids(&state), vec![1]);
        assert!(!state.list.loading);
        assert_eq!(state.list.filters, filter);
        assert_eq!(state.list.filters.page, 1);
    }

    #[test]
    fn test_initial_load_dedups_response() {
        let mut state = AnimeState::default();
        let request = state.begin_initial_load();
        state.finish_list_request(
            request,
            Ok(page(vec![anime(1, "a"), anime(1, "b"), anime(2, "c")], 1, true)),
        );
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.list.data[0].title, "a");
    }

    #[test]
    fn test_initial_load_failure_preserves_data() {
        let mut state = AnimeState::default();
        let request = state.begin_initial_load();
        state.finish_list_request(request, Ok(page(vec![anime(1, "Naruto")], 1, true)));
        let pagination = state.list.pagination.clone();

        let request = state.begin_initial_load();
        let outcome = state.finish_list_request(
            request,
            Err(ApiError::Transport("Network error".to_string())),
        );

        assert_eq!(outcome, LoadOutcome::Failed("Network error".to_string()));
        assert_eq!(state.list.error.as_deref(), Some("Network error"));
        assert_eq!(ids(&state), vec![1]);
        assert_eq!(state.list.pagination, pagination);
        assert!(!state.list.loading);
    }

    #[test]
    fn test_load_more_appends_scenario() {
        let mut state = AnimeState::default();
        state.list.data = vec![anime(1, "Naruto")];
        state.list.pagination = Pagination {
            current_page: 1,
            has_next_page: true,
            ..Default::default()
        };

        let request = state.begin_load_more().expect("next page available");
        assert_eq!(request.filter.page, 2);
        assert!(state.list.is_loading_more);

        let outcome = state.finish_list_request(
            request,
            Ok(page(vec![anime(2, "Bleach")], 2, false)),
        );

        assert_eq!(outcome, LoadOutcome::Loaded { added: 1 });
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.list.data[1].title, "Bleach");
        assert_eq!(state.list.pagination.current_page, 2);
        assert!(!state.list.is_loading_more);
    }

    #[test]
    fn test_load_more_without_next_page_is_noop() {
        let mut state = AnimeState::default();
        state.list.data = vec![anime(1, "Naruto")];
        let before = state.clone();

        assert_eq!(state.begin_load_more(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_second_load_more_ignored_while_in_flight() {
        let mut state = AnimeState::default();
        state.list.pagination.has_next_page = true;

        let first = state.begin_load_more();
        assert!(first.is_some());
        assert_eq!(state.begin_load_more(), None);
    }

    #[test]
    fn test_load_more_failure_keeps_data() {
        let mut state = AnimeState::default();
        state.list.data = vec![anime(1, "Naruto")];
        state.list.pagination.has_next_page = true;
        let pagination = state.list.pagination.clone();

        let request = state.begin_load_more().unwrap();
        let outcome = state.finish_list_request(
            request,
            Err(ApiError::Api {
                status: 429,
                message: "You are being rate limited".to_string(),
            }),
        );

        assert_eq!(
            outcome,
            LoadOutcome::Failed("You are being rate limited".to_string())
        );
        assert_eq!(ids(&state), vec![1]);
        assert_eq!(state.list.pagination, pagination);
        assert!(!state.list.is_loading_more);
    }

    #[test]
    fn test_repeated_load_more_never_duplicates() {
        let mut state = AnimeState::default();
        let request = state.begin_initial_load();
        state.finish_list_request(
            request,
            Ok(page(vec![anime(1, "a"), anime(2, "b")], 1, true)),
        );

        // overlapping pages, as happens when the ranking shifts between requests
        let pages = vec![vec![2, 3, 4], vec![4, 5], vec![1, 6]];
        let mut last_len = state.list.data.len();
        for (i, page_ids) in pages.into_iter().enumerate() {
            let request = state.begin_load_more().unwrap();
            let items = page_ids.into_iter().map(|id| anime(id, "x")).collect();
            state.finish_list_request(request, Ok(page(items, i as u32 + 2, true)));

            assert!(state.list.data.len() >= last_len);
            last_len = state.list.data.len();

            let mut seen = ids(&state);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), state.list.data.len());
        }
        assert_eq!(ids(&state), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(state.list.pagination.current_page, 4);
    }

    #[test]
    fn test_slow_initial_load_does_not_overwrite_newer() {
        let mut state = AnimeState::default();
        let slow = state.begin_initial_load();
        state.list.filters.query = "bleach".to_string();
        let fast = state.begin_initial_load();

        let outcome = state.finish_list_request(fast, Ok(page(vec![anime(2, "Bleach")], 1, false)));
        assert_eq!(outcome, LoadOutcome::Loaded { added: 1 });

        let outcome = state.finish_list_request(slow, Ok(page(vec![anime(1, "Naruto")], 1, false)));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(ids(&state), vec![2]);
        assert_eq!(state.list.filters.query, "bleach");
    }

    #[test]
    fn test_load_more_superseded_by_initial_load() {
        let mut state = AnimeState::default();
        state.list.pagination.has_next_page = true;
        let more = state.begin_load_more().unwrap();

        let initial = state.begin_initial_load();
        assert!(!state.list.is_loading_more);
        state.finish_list_request(initial, Ok(page(vec![anime(10, "new")], 1, true)));

        let outcome = state.finish_list_request(more, Ok(page(vec![anime(99, "old")], 2, true)));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(ids(&state), vec![10]);
    }
}
