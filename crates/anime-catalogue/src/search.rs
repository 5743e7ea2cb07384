//! Free-text search with debouncing.
//!
//! Keystrokes go into a [`Debouncer`]; only the last value of a burst is
//! committed once the input has been quiet for the configured delay.
//! Clearing the search bypasses the delay.

use jikan_api::FilterPatch;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Timer-based coalescing of a stream of values.
///
/// Each [`push`](Debouncer::push) replaces the pending value and restarts
/// the quiet period. [`fire`](Debouncer::fire) resolves with the pending
/// value once the period elapses; it is cancel-safe, so it can sit in a
/// `tokio::select!` loop. Dropping the debouncer drops the pending value.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the timer
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Drop the pending value, returning it if there was one
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Wait for the pending value to become due.
    ///
    /// Never resolves while nothing is pending.
    pub async fn fire(&mut self) -> T {
        loop {
            match self.deadline() {
                Some(deadline) => {
                    sleep_until(deadline).await;
                    // only taken after the sleep completed, so dropping this
                    // future early leaves the value in place
                    if let Some((value, _)) = self.pending.take() {
                        return value;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        }
    }
}

/// The search input of the listing view
#[derive(Debug)]
pub struct SearchBox {
    text: String,
    debouncer: Debouncer<String>,
}

impl SearchBox {
    pub fn new(delay: Duration) -> Self {
        Self {
            text: String::new(),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Text as typed, before trimming
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Record a keystroke burst; the commit is delayed
    pub fn input(&mut self, text: &str) {
        self.text = text.to_string();
        self.debouncer.push(text.to_string());
        debug!(text = text, "Search input scheduled");
    }

    /// Clear the search immediately, dropping any pending commit
    pub fn clear(&mut self) -> FilterPatch {
        self.text.clear();
        if let Some(dropped) = self.debouncer.cancel() {
            debug!(dropped = %dropped, "Pending search cancelled");
        }
        FilterPatch::query("")
    }

    /// Discard a pending commit without touching the text (view teardown)
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Wait for the next debounced commit
    pub async fn next_commit(&mut self) -> FilterPatch {
        let text = self.debouncer.fire().await;
        FilterPatch::query(text.trim())
    }
}
