//! Cross-surface invalidation signal.
//!
//! Every successful mutation raises the coordinator; every view that shows
//! server data subscribes and re-fetches when the token changes.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Opaque, monotonically increasing invalidation value. Only identity
/// matters; the magnitude is never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvalidationToken(u64);

impl InvalidationToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InvalidationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Default)]
pub struct InvalidationCoordinator {
    tx: Arc<watch::Sender<InvalidationToken>>,
}

impl InvalidationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the token and notify every subscriber.
    pub fn raise(&self) -> InvalidationToken {
        self.tx.send_modify(|token| token.0 += 1);
        let token = *self.tx.borrow();
        tracing::debug!(%token, "invalidation raised");
        token
    }

    pub fn current(&self) -> InvalidationToken {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<InvalidationToken> {
        self.tx.subscribe()
    }
}
