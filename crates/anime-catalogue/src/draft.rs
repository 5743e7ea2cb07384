//! Temporary filter edits.
//!
//! A [`FilterDraft`] collects structured filter changes without touching
//! the applied filters. Applying it yields a [`FilterPatch`] to merge;
//! cancelling is simply dropping it.

use chrono::NaiveDate;
use jikan_api::{
    AnimeFilter, AnimeStatus, AnimeType, FilterPatch, Genre, OrderBy, Rating, SortDirection,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while editing a draft
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("unknown filter field '{0}' (expected one of: {fields})", fields = FilterField::names().join(", "))]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: FilterField, reason: String },

    #[error("unknown genre '{0}'")]
    UnknownGenre(String),
}

/// Structured filter fields editable through a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Genres,
    Type,
    Status,
    Rating,
    OrderBy,
    Sort,
    StartDate,
    EndDate,
}

impl FilterField {
    pub const ALL: &'static [FilterField] = &[
        FilterField::Genres,
        FilterField::Type,
        FilterField::Status,
        FilterField::Rating,
        FilterField::OrderBy,
        FilterField::Sort,
        FilterField::StartDate,
        FilterField::EndDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Genres => "genres",
            FilterField::Type => "type",
            FilterField::Status => "status",
            FilterField::Rating => "rating",
            FilterField::OrderBy => "order_by",
            FilterField::Sort => "sort",
            FilterField::StartDate => "start_date",
            FilterField::EndDate => "end_date",
        }
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.as_str()).collect()
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        let wanted = match wanted.as_str() {
            "genre" => "genres",
            "order" => "order_by",
            other => other,
        };
        FilterField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| DraftError::UnknownField(s.to_string()))
    }
}

/// Pending, unapplied filter edits
#[derive(Debug, Clone)]
pub struct FilterDraft {
    base: AnimeFilter,
    patch: FilterPatch,
}

impl FilterDraft {
    /// Start editing on top of the currently applied filters
    pub fn open(applied: &AnimeFilter) -> Self {
        Self {
            base: applied.clone(),
            patch: FilterPatch::default(),
        }
    }

    /// Set a field from user text.
    ///
    /// Genres accept comma-separated ids or names; names are resolved
    /// against `genres`.
    pub fn set(&mut self, field: FilterField, value: &str, genres: &[Genre]) -> Result<(), DraftError> {
        let value = value.trim();
        let invalid = |reason: String| DraftError::InvalidValue { field, reason };

        match field {
            FilterField::Genres => {
                self.patch.genres = Some(resolve_genres(value, genres)?);
            }
            FilterField::Type => {
                self.patch.anime_type = Some(Some(value.parse::<AnimeType>().map_err(invalid)?));
            }
            FilterField::Status => {
                self.patch.status = Some(Some(value.parse::<AnimeStatus>().map_err(invalid)?));
            }
            FilterField::Rating => {
                self.patch.rating = Some(Some(value.parse::<Rating>().map_err(invalid)?));
            }
            FilterField::OrderBy => {
                self.patch.order_by = Some(Some(value.parse::<OrderBy>().map_err(invalid)?));
            }
            FilterField::Sort => {
                self.patch.sort = Some(Some(value.parse::<SortDirection>().map_err(invalid)?));
            }
            FilterField::StartDate => {
                self.patch.start_date = Some(Some(parse_date(value).map_err(invalid)?));
            }
            FilterField::EndDate => {
                self.patch.end_date = Some(Some(parse_date(value).map_err(invalid)?));
            }
        }
        Ok(())
    }

    /// Clear a field
    pub fn unset(&mut self, field: FilterField) {
        match field {
            FilterField::Genres => self.patch.genres = Some(String::new()),
            FilterField::Type => self.patch.anime_type = Some(None),
            FilterField::Status => self.patch.status = Some(None),
            FilterField::Rating => self.patch.rating = Some(None),
            FilterField::OrderBy => self.patch.order_by = Some(None),
            FilterField::Sort => self.patch.sort = Some(None),
            FilterField::StartDate => self.patch.start_date = Some(None),
            FilterField::EndDate => self.patch.end_date = Some(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }

    /// Filters as they would look once applied
    pub fn preview(&self) -> AnimeFilter {
        let mut filter = self.base.clone();
        filter.merge(self.patch.clone());
        filter
    }

    /// Consume the draft for applying
    pub fn into_patch(self) -> FilterPatch {
        self.patch
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD ({})", e))
}

/// Turn `"1, comedy"` into `"1,4"` using the genre list
fn resolve_genres(value: &str, genres: &[Genre]) -> Result<String, DraftError> {
    let mut ids = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = match part.parse::<u32>() {
            Ok(id) => id,
            Err(_) => genres
                .iter()
                .find(|g| g.name.eq_ignore_ascii_case(part))
                .map(|g| g.mal_id)
                .ok_or_else(|| DraftError::UnknownGenre(part.to_string()))?,
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(","))
}
