//! Infinite-scroll trigger.
//!
//! A sentinel sits `offset` rows before the end of the rendered list. The
//! trigger fires once per rising edge of the sentinel's visibility, never
//! while it merely stays visible.

use tracing::debug;

/// Trigger state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    /// Sentinel came into view; load more should be dispatched
    Triggered,
    /// Load more is in flight
    Loading,
}

/// Edge-triggered load-more signal
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    state: TriggerState,
    offset: usize,
    was_visible: bool,
}

impl ScrollTrigger {
    pub fn new(offset: usize) -> Self {
        Self {
            state: TriggerState::Idle,
            offset,
            was_visible: false,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether a viewport ending at row `viewport_end` (exclusive) shows the
    /// sentinel of a list with `len` rows
    pub fn sentinel_visible(&self, viewport_end: usize, len: usize) -> bool {
        viewport_end + self.offset >= len
    }

    /// Report the sentinel's current visibility.
    ///
    /// `can_load` is whether more pages remain and nothing is loading.
    /// Returns true when this report moved the trigger to `Triggered`.
    ///
    /// While idle and unable to load, visibility is not recorded: the
    /// sentinel counts as out of view until loading becomes possible, so
    /// it still fires once the blocking load finishes.
    pub fn observe(&mut self, visible: bool, can_load: bool) -> bool {
        if self.state == TriggerState::Idle && !can_load {
            self.was_visible = false;
            return false;
        }

        let rising = visible && !self.was_visible;
        self.was_visible = visible;

        if rising && self.state == TriggerState::Idle {
            debug!("Scroll sentinel became visible, triggering load more");
            self.state = TriggerState::Triggered;
            return true;
        }
        false
    }

    /// Load more was dispatched; returns false if nothing was triggered
    pub fn dispatched(&mut self) -> bool {
        if self.state == TriggerState::Triggered {
            self.state = TriggerState::Loading;
            true
        } else {
            false
        }
    }

    /// The dispatched load finished, whatever its outcome
    pub fn completed(&mut self) {
        self.state = TriggerState::Idle;
    }

    /// The list was replaced; start over with the sentinel out of view
    pub fn reset(&mut self) {
        self.state = TriggerState::Idle;
        self.was_visible = false;
    }
}

/// Window of rows shown over the rendered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
    pub rows: usize,
}

impl Viewport {
    pub fn new(rows: usize) -> Self {
        Self {
            top: 0,
            rows: rows.max(1),
        }
    }

    /// One past the last visible row, clamped to the list length
    pub fn end(&self, len: usize) -> usize {
        (self.top + self.rows).min(len)
    }

    /// Move down by `rows`, never past the last full window
    pub fn scroll_by(&mut self, rows: usize, len: usize) {
        let max_top = len.saturating_sub(self.rows);
        self.top = (self.top + rows).min(max_top);
    }

    /// Jump to the last full window
    pub fn scroll_to_end(&mut self, len: usize) {
        self.top = len.saturating_sub(self.rows);
    }

    pub fn reset(&mut self) {
        self.top = 0;
    }
}
