//! Anime catalogue browser.
//!
//! Browses the Jikan catalogue: a paginated, filterable listing with
//! debounced search and infinite scroll, plus a per-title detail view.

pub mod browser;
pub mod catalogue;
pub mod command;
pub mod detail;
pub mod draft;
pub mod list;
pub mod merge;
pub mod render;
pub mod scroll;
pub mod search;
pub mod store;

#[cfg(test)]
mod testing;

pub use browser::{Browser, Flow, Message};
pub use catalogue::Catalogue;
pub use detail::{DetailOutcome, DetailRequest};
pub use draft::{DraftError, FilterDraft, FilterField};
pub use list::{ListRequest, ListRequestKind, LoadOutcome};
pub use scroll::{ScrollTrigger, TriggerState, Viewport};
pub use search::{Debouncer, SearchBox};
pub use store::{Action, AnimeState, DetailState, ListState};
