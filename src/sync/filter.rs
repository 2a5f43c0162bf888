//! Filter criteria for the ticket collection.
//!
//! `FilterState` is the single source of truth for what the collection view
//! shows. Updates go through `set_filter` with a partial patch; observers are
//! only notified when the resulting criteria differ by value.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{Category, Priority, Status, Ticket};

/// Conjunctive filter over the ticket collection. `None` and an empty search
/// mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub search: String,
}

impl FilterCriteria {
    pub fn has_active_filters(&self) -> bool {
        self.category.is_some()
            || self.priority.is_some()
            || self.status.is_some()
            || !self.search.is_empty()
    }

    /// Whether a ticket satisfies every active criterion. Search is a
    /// case-insensitive substring match on title or description.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.category.is_some_and(|c| c != ticket.category) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        ticket.title.to_lowercase().contains(&needle)
            || ticket.description.to_lowercase().contains(&needle)
    }

    /// Query parameters for the active criteria, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}

/// A partial update to `FilterCriteria`. Only fields that are `Some` are
/// replaced; `Some(None)` clears a select filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub category: Option<Option<Category>>,
    pub priority: Option<Option<Priority>>,
    pub status: Option<Option<Status>>,
    pub search: Option<String>,
}

impl FilterPatch {
    pub fn category(category: Option<Category>) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn priority(priority: Option<Priority>) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn status(status: Option<Status>) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    fn apply(self, criteria: &mut FilterCriteria) -> bool {
        let before = criteria.clone();
        if let Some(category) = self.category {
            criteria.category = category;
        }
        if let Some(priority) = self.priority {
            criteria.priority = priority;
        }
        if let Some(status) = self.status {
            criteria.status = status;
        }
        if let Some(search) = self.search {
            criteria.search = search;
        }
        *criteria != before
    }
}

/// Shared, observable filter state.
#[derive(Clone)]
pub struct FilterState {
    tx: Arc<watch::Sender<FilterCriteria>>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterCriteria::default())
    }
}

impl FilterState {
    pub fn new(initial: FilterCriteria) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace only the fields present in `patch`. Returns whether the
    /// criteria changed; observers are notified only in that case.
    pub fn set_filter(&self, patch: FilterPatch) -> bool {
        let changed = self.tx.send_if_modified(|criteria| patch.apply(criteria));
        if changed {
            tracing::debug!(criteria = ?*self.tx.borrow(), "filter criteria changed");
        }
        changed
    }

    /// Reset all four fields in a single update.
    pub fn clear_filters(&self) -> bool {
        self.tx.send_if_modified(|criteria| {
            if !criteria.has_active_filters() {
                return false;
            }
            *criteria = FilterCriteria::default();
            true
        })
    }

    pub fn current(&self) -> FilterCriteria {
        self.tx.borrow().clone()
    }

    pub fn has_active_filters(&self) -> bool {
        self.tx.borrow().has_active_filters()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterCriteria> {
        self.tx.subscribe()
    }
}
