//! Client-side state synchronization.
//!
//! Each display surface (ticket list, stats, creation form) keeps its own
//! observable state in a `tokio::sync::watch` channel. Surfaces are tied
//! together by two shared signals: `FilterState` for what the list shows and
//! `InvalidationCoordinator` for "server data changed, fetch again".
//!
//! Every network call is tagged with a sequence number when it is issued.
//! A response is applied only if no newer request was issued in the meantime,
//! so completion order never decides what is displayed.

pub mod classification;
pub mod collection;
pub mod creation;
pub mod debounce;
pub mod filter;
pub mod form;
pub mod invalidation;
pub mod stats;

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, TicketDeskError};

pub use classification::{ClassificationController, ClassifyOutcome};
pub use collection::{CollectionState, MutationOutcome, TicketCollection};
pub use creation::{CreationPolicy, SubmitOutcome, TicketCreationController};
pub use debounce::SearchInput;
pub use filter::{FilterCriteria, FilterPatch, FilterState};
pub use form::{FormState, OverrideFlags, TicketForm};
pub use invalidation::{InvalidationCoordinator, InvalidationToken};
pub use stats::{StatsState, StatsView};

/// Run a service call with an upper bound; a timeout is an ordinary network
/// failure.
pub(crate) async fn bounded<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(TicketDeskError::NetworkFailure(format!(
            "request timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

/// Issues strictly increasing request numbers and remembers the latest.
#[derive(Debug, Default)]
pub(crate) struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub(crate) fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub(crate) fn is_latest(&self, seq: u64) -> bool {
        self.latest == seq
    }

    pub(crate) fn latest(&self) -> u64 {
        self.latest
    }
}
