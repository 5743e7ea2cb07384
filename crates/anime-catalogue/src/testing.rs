//! In-memory [`AnimeSource`] for tests.

use jikan_api::{
    Anime, AnimeFilter, AnimePage, AnimeSource, ApiError, Genre, Pagination,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn anime(mal_id: u32, title: &str) -> Anime {
    Anime {
        mal_id,
        title: title.to_string(),
        ..Default::default()
    }
}

pub fn genre(mal_id: u32, name: &str) -> Genre {
    Genre {
        mal_id,
        name: name.to_string(),
        url: String::new(),
        count: 0,
    }
}

pub fn page(items: Vec<Anime>, current_page: u32, has_next_page: bool) -> AnimePage {
    AnimePage {
        data: items,
        pagination: Pagination {
            current_page,
            has_next_page,
            ..Default::default()
        },
    }
}

#[derive(Default)]
struct Inner {
    pages: VecDeque<(Duration, Result<AnimePage, ApiError>)>,
    requests: Vec<AnimeFilter>,
    details: HashMap<String, (Duration, Result<Anime, ApiError>)>,
    genres: Option<Result<Vec<Genre>, ApiError>>,
}

/// Scripted source: listing responses are served in push order, details by
/// id. Optional delays run on the tokio clock.
#[derive(Clone, Default)]
pub struct FakeSource {
    inner: Arc<Mutex<Inner>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, result: Result<AnimePage, ApiError>) {
        self.push_page_after(Duration::ZERO, result);
    }

    pub fn push_page_after(&self, delay: Duration, result: Result<AnimePage, ApiError>) {
        self.inner.lock().unwrap().pages.push_back((delay, result));
    }

    pub fn set_detail(&self, id: &str, result: Result<Anime, ApiError>) {
        self.set_detail_after(id, Duration::ZERO, result);
    }

    pub fn set_detail_after(&self, id: &str, delay: Duration, result: Result<Anime, ApiError>) {
        self.inner
            .lock()
            .unwrap()
            .details
            .insert(id.to_string(), (delay, result));
    }

    pub fn set_genres(&self, result: Result<Vec<Genre>, ApiError>) {
        self.inner.lock().unwrap().genres = Some(result);
    }

    /// Filters received by `search_anime`, in call order
    pub fn requests(&self) -> Vec<AnimeFilter> {
        self.inner.lock().unwrap().requests.clone()
    }
}

impl AnimeSource for FakeSource {
    async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let scripted = self.inner.lock().unwrap().genres.clone();
        scripted.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn search_anime(&self, filter: &AnimeFilter) -> Result<AnimePage, ApiError> {
        let (delay, result) = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(filter.clone());
            inner
                .pages
                .pop_front()
                .unwrap_or_else(|| (Duration::ZERO, Err(ApiError::Transport("no scripted page".to_string()))))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn anime(&self, id: &str) -> Result<Anime, ApiError> {
        let (delay, result) = {
            let inner = self.inner.lock().unwrap();
            inner.details.get(id).cloned().unwrap_or_else(|| {
                (
                    Duration::ZERO,
                    Err(ApiError::NotFound {
                        message: "404 Not Found".to_string(),
                    }),
                )
            })
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
