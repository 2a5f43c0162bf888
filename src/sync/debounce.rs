//! Debounced free-text search input.
//!
//! Keystrokes update the displayed text immediately. Propagation into
//! `FilterCriteria::search` waits for a quiet period after the last
//! keystroke; every keystroke cancels the pending timer, so at most one
//! timer is pending at a time.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::filter::{FilterPatch, FilterState};

/// Default quiet period before search text is propagated.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

struct InputState {
    text: String,
    /// Bumped on every keystroke; a timer only fires for its own keystroke.
    keystroke: u64,
    pending: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct SearchInput {
    filters: FilterState,
    delay: Duration,
    state: Arc<Mutex<InputState>>,
}

impl SearchInput {
    pub fn new(filters: FilterState, delay: Duration) -> Self {
        let text = filters.current().search;
        Self {
            filters,
            delay,
            state: Arc::new(Mutex::new(InputState {
                text,
                keystroke: 0,
                pending: None,
            })),
        }
    }

    /// Record a keystroke. Must be called from within a tokio runtime.
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.state.lock();
        state.text = text.clone();
        state.keystroke += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let keystroke = state.keystroke;
        let delay = self.delay;
        let filters = self.filters.clone();
        let shared = Arc::downgrade(&self.state);
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared.lock();
            if state.keystroke != keystroke {
                return;
            }
            state.pending = None;
            filters.set_filter(FilterPatch::search(text));
        }));
    }

    /// The text as currently displayed, ahead of propagation.
    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Propagate the displayed text now, cancelling the timer.
    pub fn flush(&self) {
        let mut state = self.state.lock();
        state.keystroke += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        self.filters.set_filter(FilterPatch::search(state.text.clone()));
    }

    /// Clear the search box and every filter in one update.
    pub fn clear_filters(&self) {
        let mut state = self.state.lock();
        state.keystroke += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.text.clear();
        self.filters.clear_filters();
    }
}

impl Drop for InputState {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
