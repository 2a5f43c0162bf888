//! Aggregate statistics view.
//!
//! Depends only on the invalidation token: any mutation anywhere makes the
//! dashboard fetch again. A failed fetch keeps the last good statistics on
//! screen next to an error message.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ErrorKind;
use crate::remote::TicketService;
use crate::types::TicketStats;

use super::invalidation::InvalidationCoordinator;
use super::{RequestSequence, bounded};

pub const STATS_ERROR_MESSAGE: &str = "Failed to load statistics.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsState {
    pub loading: bool,
    pub stats: Option<TicketStats>,
    pub error: Option<ErrorKind>,
}

impl StatsState {
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(|_| STATS_ERROR_MESSAGE)
    }
}

/// Share of `value` in `total` as a whole percentage; 0 when there is
/// nothing to divide.
pub fn breakdown_percentage(value: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((value as f64 / total as f64) * 100.0).round() as u64
}

pub struct StatsView {
    service: Arc<dyn TicketService>,
    invalidation: InvalidationCoordinator,
    timeout: Duration,
    state: watch::Sender<StatsState>,
    fetches: Mutex<RequestSequence>,
}

impl StatsView {
    pub fn new(
        service: Arc<dyn TicketService>,
        invalidation: InvalidationCoordinator,
        timeout: Duration,
    ) -> Arc<Self> {
        let (state, _rx) = watch::channel(StatsState::default());
        Arc::new(Self {
            service,
            invalidation,
            timeout,
            state,
            fetches: Mutex::new(RequestSequence::default()),
        })
    }

    pub fn snapshot(&self) -> StatsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatsState> {
        self.state.subscribe()
    }

    pub async fn refresh(&self) {
        let seq = self.begin_fetch();
        self.finish_fetch(seq).await;
    }

    fn begin_fetch(&self) -> u64 {
        let seq = self.fetches.lock().issue();
        self.state.send_modify(|state| state.loading = true);
        seq
    }

    async fn finish_fetch(&self, seq: u64) {
        let result = bounded(self.timeout, self.service.fetch_stats()).await;

        let fetches = self.fetches.lock();
        if !fetches.is_latest(seq) {
            tracing::debug!(seq, latest = fetches.latest(), "discarding stale stats");
            return;
        }
        match result {
            Ok(stats) => self.state.send_modify(|state| {
                state.loading = false;
                state.stats = Some(stats);
                state.error = None;
            }),
            Err(e) => {
                tracing::warn!(seq, error = %e, "failed to load statistics");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(e.kind());
                });
            }
        }
    }

    /// Fetch now and again after every invalidation. Abort the handle to stop.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut token_rx = this.invalidation.subscribe();
            loop {
                token_rx.borrow_and_update();
                let seq = this.begin_fetch();
                let view = Arc::clone(&this);
                tokio::spawn(async move { view.finish_fetch(seq).await });
                if token_rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
