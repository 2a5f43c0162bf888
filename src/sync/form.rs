//! State of an in-progress ticket creation form.
//!
//! The form is shared by the creation controller (validation, submission)
//! and the classification controller (suggested category/priority). Manual
//! edits of category or priority set a sticky override flag so that later
//! suggestions leave the field alone. Flags reset when the form is reset or
//! a submission succeeds.
//!
//! Each form lifetime has a session number. Reset, successful submission and
//! close start a new session, and async results tagged with an older session
//! are ignored.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{Category, ClassificationSuggestion, Priority};

/// Which fields the user has set by hand during this form lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideFlags {
    pub category: bool,
    pub priority: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub overrides: OverrideFlags,
    /// A classification request is outstanding.
    pub classifying: bool,
    pub submitting: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
    /// The enclosing surface was closed; the form no longer accepts results.
    pub closed: bool,
    pub(crate) session: u64,
}

impl FormState {
    pub fn session(&self) -> u64 {
        self.session
    }

    fn clear_fields(&mut self) {
        self.title.clear();
        self.description.clear();
        self.category = None;
        self.priority = None;
        self.overrides = OverrideFlags::default();
        self.classifying = false;
        self.session += 1;
    }
}

/// Which suggested fields were written into the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedSuggestion {
    pub category: bool,
    pub priority: bool,
}

#[derive(Clone)]
pub struct TicketForm {
    state: Arc<watch::Sender<FormState>>,
}

impl Default for TicketForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketForm {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FormState::default());
        Self { state: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.state.send_if_modified(|form| replace(&mut form.title, title));
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.state
            .send_if_modified(|form| replace(&mut form.description, description));
    }

    /// Manual category choice. Marks the field as overridden even when the
    /// choice equals the current value.
    pub fn select_category(&self, category: Option<Category>) {
        self.state.send_modify(|form| {
            form.category = category;
            form.overrides.category = true;
        });
    }

    /// Manual priority choice. Marks the field as overridden.
    pub fn select_priority(&self, priority: Option<Priority>) {
        self.state.send_modify(|form| {
            form.priority = priority;
            form.overrides.priority = true;
        });
    }

    /// Clear every field, the override flags and any message.
    pub fn reset(&self) {
        self.state.send_modify(|form| {
            form.clear_fields();
            form.submitting = false;
            form.error = None;
            form.success_message = None;
        });
    }

    /// Close the enclosing surface. Outstanding results for this form are
    /// ignored from now on.
    pub fn close(&self) {
        self.state.send_if_modified(|form| {
            if form.closed {
                return false;
            }
            form.closed = true;
            form.classifying = false;
            form.session += 1;
            true
        });
    }

    /// Reopen a closed form with empty fields.
    pub fn reopen(&self) {
        self.state.send_modify(|form| {
            form.clear_fields();
            form.closed = false;
            form.submitting = false;
            form.error = None;
            form.success_message = None;
        });
    }

    pub(crate) fn set_classifying(&self, session: u64, classifying: bool) {
        self.state.send_if_modified(|form| {
            if form.session != session || form.classifying == classifying {
                return false;
            }
            form.classifying = classifying;
            true
        });
    }

    /// Write a suggestion into every field the user has not overridden.
    /// Returns `None` if the session has ended.
    pub(crate) fn apply_suggestion(
        &self,
        session: u64,
        suggestion: &ClassificationSuggestion,
    ) -> Option<AppliedSuggestion> {
        let mut applied = None;
        self.state.send_if_modified(|form| {
            if form.session != session {
                return false;
            }
            let mut result = AppliedSuggestion::default();
            if !form.overrides.category {
                form.category = Some(suggestion.suggested_category);
                result.category = true;
            }
            if !form.overrides.priority {
                form.priority = Some(suggestion.suggested_priority);
                result.priority = true;
            }
            form.classifying = false;
            applied = Some(result);
            true
        });
        applied
    }

    /// Mark a submission as started. Returns the form contents, or `None` if
    /// a submission is already running.
    pub(crate) fn begin_submit(&self) -> Option<FormState> {
        let mut started = None;
        self.state.send_if_modified(|form| {
            if form.submitting {
                return false;
            }
            form.submitting = true;
            form.error = None;
            form.success_message = None;
            started = Some(form.clone());
            true
        });
        started
    }

    /// Record a validation error without touching the fields.
    pub(crate) fn reject(&self, message: String) {
        self.state.send_modify(|form| {
            form.submitting = false;
            form.error = Some(message);
            form.success_message = None;
        });
    }

    /// Clear the form after a successful submission and start a new session.
    /// Returns the new session.
    pub(crate) fn complete_submit(&self, message: &str) -> u64 {
        let mut session = 0;
        self.state.send_modify(|form| {
            form.clear_fields();
            form.submitting = false;
            form.error = None;
            form.success_message = Some(message.to_string());
            session = form.session;
        });
        session
    }

    /// Clear the success message of `session`, closing the form if asked.
    pub(crate) fn expire_success(&self, session: u64, close: bool) {
        self.state.send_if_modified(|form| {
            if form.session != session || form.success_message.is_none() {
                return false;
            }
            form.success_message = None;
            if close {
                form.closed = true;
                form.session += 1;
            }
            true
        });
    }
}

fn replace(field: &mut String, value: String) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    true
}
