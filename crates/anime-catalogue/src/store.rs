//! Catalogue state and its reducer.
//!
//! All mutation goes through [`AnimeState::reduce`]. The list and detail
//! coordinators decide *which* action to dispatch (including discarding
//! stale responses); the reducer only applies it.

use crate::merge::{append_unique, dedup_by_id};
use jikan_api::{Anime, AnimeFilter, AnimePage, FilterPatch, Pagination, PAGE_LIMIT};
use tracing::trace;

/// Listing state
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    /// Applied filters; after a successful initial load this equals the
    /// request filter exactly
    pub filters: AnimeFilter,
    /// Loaded titles, unique by `mal_id`, in the order they were received
    pub data: Vec<Anime>,
    pub pagination: Pagination,
    /// An initial load is in flight
    pub loading: bool,
    /// A load-more is in flight
    pub is_loading_more: bool,
    pub error: Option<String>,
    /// Advanced by every initial load; older responses are stale
    pub generation: u64,
    /// Items requested per page
    pub page_limit: u32,
}

/// Detail view state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub anime: Option<Anime>,
    pub loading: bool,
    pub error: Option<String>,
    /// The last failure was a 404 from the API
    pub not_found: bool,
    /// Advanced by every fetch and by clear; older responses are stale
    pub request: u64,
}

/// Whole catalogue state
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeState {
    pub list: ListState,
    pub detail: DetailState,
}

/// State transitions
#[derive(Debug, Clone)]
pub enum Action {
    /// Merge a partial filter update into the applied filters
    SetFilters(FilterPatch),
    /// Restore default filters, keeping the search text
    ResetFilters,

    InitialLoadStarted,
    InitialLoadSucceeded { filter: AnimeFilter, page: AnimePage },
    InitialLoadFailed { message: String },

    LoadMoreStarted,
    LoadMoreSucceeded { page_number: u32, page: AnimePage },
    LoadMoreFailed { message: String },

    DetailStarted,
    DetailSucceeded { anime: Anime },
    DetailFailed { message: String, not_found: bool },
    ClearDetail,
}

impl ListState {
    pub fn new(page_limit: u32) -> Self {
        Self {
            filters: AnimeFilter {
                limit: page_limit,
                ..AnimeFilter::default()
            },
            data: Vec::new(),
            pagination: Pagination::default(),
            loading: false,
            is_loading_more: false,
            error: None,
            generation: 0,
            page_limit,
        }
    }

    /// Whether "load more" may proceed right now
    pub fn can_load_more(&self) -> bool {
        self.pagination.has_next_page && !self.loading && !self.is_loading_more
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(PAGE_LIMIT)
    }
}

impl Default for AnimeState {
    fn default() -> Self {
        Self::new(PAGE_LIMIT)
    }
}

impl AnimeState {
    pub fn new(page_limit: u32) -> Self {
        Self {
            list: ListState::new(page_limit),
            detail: DetailState::default(),
        }
    }

    /// Apply one action
    pub fn reduce(&mut self, action: Action) {
        trace!(?action, "Reducing action");

        let list = &mut self.list;
        let detail = &mut self.detail;

        match action {
            Action::SetFilters(patch) => {
                list.filters.merge(patch);
            }
            Action::ResetFilters => {
                list.filters = AnimeFilter {
                    limit: list.page_limit,
                    ..list.filters.reset_keeping_query()
                };
            }

            Action::InitialLoadStarted => {
                list.generation += 1;
                list.loading = true;
                list.error = None;
                // any outstanding load-more now belongs to an older generation
                list.is_loading_more = false;
            }
            Action::InitialLoadSucceeded { filter, page } => {
                list.loading = false;
                list.data = dedup_by_id(page.data);
                list.pagination = page.pagination;
                list.pagination.current_page = filter.page;
                list.filters = filter;
            }
            Action::InitialLoadFailed { message } => {
                list.loading = false;
                list.error = Some(message);
            }

            Action::LoadMoreStarted => {
                list.is_loading_more = true;
            }
            Action::LoadMoreSucceeded { page_number, page } => {
                list.is_loading_more = false;
                append_unique(&mut list.data, page.data);
                list.pagination = page.pagination;
                list.pagination.current_page = page_number;
            }
            Action::LoadMoreFailed { message } => {
                list.is_loading_more = false;
                list.error = Some(message);
            }

            Action::DetailStarted => {
                detail.request += 1;
                detail.loading = true;
                detail.anime = None;
                detail.error = None;
                detail.not_found = false;
            }
            Action::DetailSucceeded { anime } => {
                detail.loading = false;
                detail.anime = Some(anime);
            }
            Action::DetailFailed { message, not_found } => {
                detail.loading = false;
                detail.anime = None;
                detail.error = Some(message);
                detail.not_found = not_found;
            }
            Action::ClearDetail => {
                detail.request += 1;
                detail.anime = None;
                detail.error = None;
                detail.loading = false;
                detail.not_found = false;
            }
        }
    }
}
