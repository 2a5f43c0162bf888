//! Ticket collection synchronizer.
//!
//! Keeps the displayed ticket list consistent with the remote store for the
//! current filter criteria and invalidation token. A fetch is issued whenever
//! either input changes; only the most recently issued fetch may update the
//! display. Data from the previous fetch stays visible while a new one is in
//! flight.
//!
//! Status changes are optimistic: the target status is shown before the
//! service answers and reverted to the last confirmed status if the update
//! fails. Failures on this path are logged, never surfaced.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ErrorKind;
use crate::remote::{TicketService, TicketUpdate};
use crate::types::{Status, Ticket, TicketId};

use super::filter::{FilterCriteria, FilterState};
use super::invalidation::{InvalidationCoordinator, InvalidationToken};
use super::{RequestSequence, bounded};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load tickets. Please try again.";
pub const EMPTY_FILTERED_MESSAGE: &str =
    "No tickets match your filters. Try adjusting your search criteria.";
pub const EMPTY_MESSAGE: &str = "No tickets yet. Submit one above!";

/// Observable state of the ticket list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    /// A fetch is in flight. Previously loaded tickets remain in `tickets`.
    pub loading: bool,
    pub tickets: Vec<Ticket>,
    /// Failure of the latest fetch, if it failed.
    pub error: Option<ErrorKind>,
    /// Criteria the displayed tickets were fetched with.
    pub criteria: FilterCriteria,
    /// At least one fetch has completed successfully.
    pub loaded: bool,
    /// Tickets with a status update in flight.
    pub updating: Vec<TicketId>,
}

impl CollectionState {
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(|_| LOAD_ERROR_MESSAGE)
    }

    pub fn is_updating(&self, id: TicketId) -> bool {
        self.updating.contains(&id)
    }

    fn set_status(&mut self, id: TicketId, status: Status) {
        if let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == id) {
            ticket.status = status;
        }
    }
}

/// Result of a status change, for callers that want to report it. Failures
/// are already handled by reverting the displayed status.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Confirmed(Ticket),
    Reverted,
}

#[derive(Debug, Clone, Copy)]
struct PendingMutation {
    seq: u64,
    target: Status,
}

#[derive(Default)]
struct SyncInner {
    fetches: RequestSequence,
    /// Inputs of the most recently issued fetch.
    last_issued: Option<(FilterCriteria, InvalidationToken)>,
    mutations: RequestSequence,
    pending: HashMap<TicketId, PendingMutation>,
    /// Last server-confirmed status for tickets with a pending mutation.
    confirmed: HashMap<TicketId, Status>,
}

pub struct TicketCollection {
    service: Arc<dyn TicketService>,
    filters: FilterState,
    invalidation: InvalidationCoordinator,
    timeout: Duration,
    state: watch::Sender<CollectionState>,
    inner: Mutex<SyncInner>,
}

impl TicketCollection {
    pub fn new(
        service: Arc<dyn TicketService>,
        filters: FilterState,
        invalidation: InvalidationCoordinator,
        timeout: Duration,
    ) -> Arc<Self> {
        let (state, _rx) = watch::channel(CollectionState::default());
        Arc::new(Self {
            service,
            filters,
            invalidation,
            timeout,
            state,
            inner: Mutex::new(SyncInner::default()),
        })
    }

    pub fn snapshot(&self) -> CollectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState> {
        self.state.subscribe()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Empty-state text for the current filters.
    pub fn empty_message(&self) -> &'static str {
        if self.filters.has_active_filters() {
            EMPTY_FILTERED_MESSAGE
        } else {
            EMPTY_MESSAGE
        }
    }

    /// Fetch for the current criteria and token, unconditionally.
    pub async fn refresh(&self) {
        let criteria = self.filters.current();
        let token = self.invalidation.current();
        let seq = self.begin_fetch(criteria.clone(), token);
        self.finish_fetch(seq, criteria).await;
    }

    /// Watch filters and invalidation in the background, fetching on every
    /// change. Abort the handle to stop.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await })
    }

    async fn run(self: Arc<Self>) {
        let mut filters_rx = self.filters.subscribe();
        let mut token_rx = self.invalidation.subscribe();

        loop {
            let criteria = filters_rx.borrow_and_update().clone();
            let token = *token_rx.borrow_and_update();

            if !self.is_last_issued(&criteria, token) {
                let seq = self.begin_fetch(criteria.clone(), token);
                let this = Arc::clone(&self);
                tokio::spawn(async move { this.finish_fetch(seq, criteria).await });
            }

            tokio::select! {
                changed = filters_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = token_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }

    fn is_last_issued(&self, criteria: &FilterCriteria, token: InvalidationToken) -> bool {
        let inner = self.inner.lock();
        inner
            .last_issued
            .as_ref()
            .is_some_and(|(c, t)| c == criteria && *t == token)
    }

    /// Assign the next sequence number and flag loading. Synchronous so that
    /// issuance order is fixed before any await.
    fn begin_fetch(&self, criteria: FilterCriteria, token: InvalidationToken) -> u64 {
        let mut inner = self.inner.lock();
        let seq = inner.fetches.issue();
        tracing::debug!(seq, ?criteria, %token, "fetching tickets");
        inner.last_issued = Some((criteria, token));
        self.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = true;
            !was_loading
        });
        seq
    }

    async fn finish_fetch(&self, seq: u64, criteria: FilterCriteria) {
        let result = bounded(self.timeout, self.service.list_tickets(&criteria)).await;

        let mut inner = self.inner.lock();
        if !inner.fetches.is_latest(seq) {
            tracing::debug!(
                seq,
                latest = inner.fetches.latest(),
                "discarding stale ticket list"
            );
            return;
        }

        match result {
            Ok(mut tickets) => {
                for ticket in &mut tickets {
                    if let Some(mutation) = inner.pending.get(&ticket.id).copied() {
                        inner.confirmed.insert(ticket.id, ticket.status);
                        ticket.status = mutation.target;
                    }
                }
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.tickets = tickets;
                    state.error = None;
                    state.criteria = criteria;
                    state.loaded = true;
                });
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "failed to load tickets");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(e.kind());
                });
            }
        }
    }

    /// Change a ticket's status optimistically.
    ///
    /// The displayed status switches to `status` immediately. On failure it
    /// reverts to the last status confirmed by the service and the error is
    /// only logged. On success the invalidation coordinator is raised, which
    /// makes every subscribed view fetch again.
    pub async fn set_status(&self, id: TicketId, status: Status) -> MutationOutcome {
        let seq = {
            let mut inner = self.inner.lock();
            let seq = inner.mutations.issue();
            let displayed = self.state.borrow().ticket(id).map(|t| t.status);
            if let Some(displayed) = displayed {
                inner.confirmed.entry(id).or_insert(displayed);
            }
            inner.pending.insert(id, PendingMutation { seq, target: status });
            self.state.send_modify(|state| {
                state.set_status(id, status);
                if !state.updating.contains(&id) {
                    state.updating.push(id);
                }
            });
            seq
        };

        tracing::debug!(id, %status, seq, "updating ticket status");
        let result = bounded(
            self.timeout,
            self.service.update_ticket(id, &TicketUpdate::status(status)),
        )
        .await;

        let outcome = {
            let mut inner = self.inner.lock();
            let is_latest = inner.pending.get(&id).is_some_and(|m| m.seq == seq);

            match result {
                Ok(ticket) => {
                    if is_latest {
                        inner.pending.remove(&id);
                        inner.confirmed.remove(&id);
                        self.state.send_modify(|state| {
                            if let Some(shown) = state.tickets.iter_mut().find(|t| t.id == id) {
                                *shown = ticket.clone();
                            }
                            state.updating.retain(|t| *t != id);
                        });
                    } else {
                        // A newer change owns the display; this one is now the
                        // fallback if that change fails.
                        inner.confirmed.insert(id, ticket.status);
                    }
                    MutationOutcome::Confirmed(ticket)
                }
                Err(e) => {
                    tracing::warn!(id, %status, error = %e, "status update failed, reverting");
                    if is_latest {
                        inner.pending.remove(&id);
                        let confirmed = inner.confirmed.remove(&id);
                        self.state.send_modify(|state| {
                            if let Some(confirmed) = confirmed {
                                state.set_status(id, confirmed);
                            }
                            state.updating.retain(|t| *t != id);
                        });
                    }
                    MutationOutcome::Reverted
                }
            }
        };

        if matches!(outcome, MutationOutcome::Confirmed(_)) {
            self.invalidation.raise();
        }
        outcome
    }
}
