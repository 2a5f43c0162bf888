//! AI classification suggestions for the creation form.
//!
//! A request is issued when the description field loses focus and its
//! trimmed text is long enough. Only the most recently issued request may
//! write into the form; earlier ones are dropped whatever order they resolve
//! in. Failures fail open: the form keeps whatever the user last chose.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::remote::TicketService;
use crate::types::ClassificationSuggestion;

use super::form::{AppliedSuggestion, TicketForm};
use super::{RequestSequence, bounded};

/// Descriptions shorter than this (after trimming) are never classified.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// No request was made: description too short or form closed.
    Skipped,
    Applied {
        suggestion: ClassificationSuggestion,
        applied: AppliedSuggestion,
    },
    /// The service had no suggestion; the form is unchanged.
    Unavailable,
    /// A newer request was issued before this one resolved.
    Superseded,
    /// The form was reset, submitted or closed while the request ran.
    Discarded,
}

pub struct ClassificationController {
    service: Arc<dyn TicketService>,
    form: TicketForm,
    timeout: Duration,
    min_chars: usize,
    requests: Mutex<RequestSequence>,
}

impl ClassificationController {
    pub fn new(service: Arc<dyn TicketService>, form: TicketForm, timeout: Duration) -> Self {
        Self {
            service,
            form,
            timeout,
            min_chars: MIN_DESCRIPTION_CHARS,
            requests: Mutex::new(RequestSequence::default()),
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn form(&self) -> &TicketForm {
        &self.form
    }

    /// Handle the description field losing focus.
    pub async fn on_description_blur(&self) -> ClassifyOutcome {
        let snapshot = self.form.snapshot();
        if snapshot.closed || snapshot.description.trim().chars().count() < self.min_chars {
            return ClassifyOutcome::Skipped;
        }

        let session = snapshot.session();
        let seq = self.requests.lock().issue();
        self.form.set_classifying(session, true);
        tracing::debug!(seq, session, "requesting classification");

        let result = bounded(self.timeout, self.service.classify(&snapshot.description)).await;

        let requests = self.requests.lock();
        if !requests.is_latest(seq) {
            tracing::debug!(seq, latest = requests.latest(), "discarding superseded classification");
            return ClassifyOutcome::Superseded;
        }

        match result {
            Ok(suggestion) => match self.form.apply_suggestion(session, &suggestion) {
                Some(applied) => ClassifyOutcome::Applied {
                    suggestion,
                    applied,
                },
                None => ClassifyOutcome::Discarded,
            },
            Err(e) => {
                tracing::warn!(seq, error = %e, "classification unavailable, keeping manual fields");
                self.form.set_classifying(session, false);
                if self.form.snapshot().session() != session {
                    return ClassifyOutcome::Discarded;
                }
                ClassifyOutcome::Unavailable
            }
        }
    }
}
