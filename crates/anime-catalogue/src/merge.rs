//! De-duplication of paginated results by `mal_id`.
//!
//! The first occurrence of an id always wins, both within one page and when
//! a new page is appended to what is already loaded.

use jikan_api::Anime;
use std::collections::HashSet;

/// Drop repeated ids, keeping the first occurrence and the original order
pub fn dedup_by_id(items: Vec<Anime>) -> Vec<Anime> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|anime| seen.insert(anime.mal_id))
        .collect()
}

/// Append `incoming` to `existing`; entries already loaded win over
/// newly fetched duplicates.
///
/// Returns how many new entries were kept.
pub fn append_unique(existing: &mut Vec<Anime>, incoming: Vec<Anime>) -> usize {
    let mut seen: HashSet<u32> = existing.iter().map(|a| a.mal_id).collect();
    let before = existing.len();
    existing.extend(incoming.into_iter().filter(|anime| seen.insert(anime.mal_id)));
    existing.len() - before
}
