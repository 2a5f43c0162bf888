//! Ticket creation controller.
//!
//! Validates the shared form, submits it, and on success clears the form,
//! shows a transient success message and raises invalidation so every view
//! fetches again. On failure the form is left intact with an inline error.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::TicketDeskError;
use crate::remote::{NewTicket, TicketService};
use crate::types::{MAX_TITLE_LEN, Ticket};

use super::bounded;
use super::classification::{ClassificationController, ClassifyOutcome};
use super::form::{FormState, TicketForm};
use super::invalidation::InvalidationCoordinator;

pub const SUCCESS_MESSAGE: &str = "Ticket created successfully!";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";
pub const MISSING_TEXT_MESSAGE: &str = "Title and description are required.";

/// How creation behaves; see `Config` for the file keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationPolicy {
    /// Category and priority must be chosen (by hand or by suggestion).
    pub require_category_priority: bool,
    pub success_message: Duration,
    pub close_on_success: bool,
}

impl Default for CreationPolicy {
    fn default() -> Self {
        Self {
            require_category_priority: true,
            success_message: Duration::from_secs(3),
            close_on_success: false,
        }
    }
}

impl From<&Config> for CreationPolicy {
    fn from(config: &Config) -> Self {
        Self {
            require_category_priority: config.require_category_priority,
            success_message: config.success_message_duration(),
            close_on_success: config.close_on_success,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Ticket),
    /// Local validation failed; no request was made.
    Invalid(String),
    /// The service rejected the ticket or could not be reached.
    Failed(String),
    /// A submission is already in flight.
    Busy,
}

/// Check the form and build the request payload.
pub fn validate(form: &FormState, policy: &CreationPolicy) -> Result<NewTicket, String> {
    let title_missing = form.title.trim().is_empty();
    let description_missing = form.description.trim().is_empty();

    if policy.require_category_priority {
        if title_missing || description_missing || form.category.is_none() || form.priority.is_none()
        {
            return Err(MISSING_FIELDS_MESSAGE.to_string());
        }
    } else if title_missing || description_missing {
        return Err(MISSING_TEXT_MESSAGE.to_string());
    }

    if form.title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("Title must be at most {MAX_TITLE_LEN} characters."));
    }

    Ok(NewTicket {
        title: form.title.clone(),
        description: form.description.clone(),
        category: form.category,
        priority: form.priority,
    })
}

/// Inline message for a failed submission.
pub fn failure_message(error: &TicketDeskError) -> String {
    match error.field_errors() {
        Some(errors) if !errors.is_empty() => errors.to_string(),
        _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

pub struct TicketCreationController {
    service: Arc<dyn TicketService>,
    form: TicketForm,
    classifier: ClassificationController,
    invalidation: InvalidationCoordinator,
    policy: CreationPolicy,
    timeout: Duration,
}

impl TicketCreationController {
    pub fn new(
        service: Arc<dyn TicketService>,
        invalidation: InvalidationCoordinator,
        policy: CreationPolicy,
        timeout: Duration,
    ) -> Self {
        let form = TicketForm::new();
        let classifier = ClassificationController::new(Arc::clone(&service), form.clone(), timeout);
        Self {
            service,
            form,
            classifier,
            invalidation,
            policy,
            timeout,
        }
    }

    pub fn from_config(
        service: Arc<dyn TicketService>,
        invalidation: InvalidationCoordinator,
        config: &Config,
    ) -> Self {
        let mut controller = Self::new(
            service,
            invalidation,
            CreationPolicy::from(config),
            config.request_timeout(),
        );
        controller.classifier = controller.classifier.with_min_chars(config.classify_min_chars);
        controller
    }

    pub fn form(&self) -> &TicketForm {
        &self.form
    }

    pub fn policy(&self) -> &CreationPolicy {
        &self.policy
    }

    /// Forward a description blur to the classification controller.
    pub async fn description_blurred(&self) -> ClassifyOutcome {
        self.classifier.on_description_blur().await
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(form) = self.form.begin_submit() else {
            return SubmitOutcome::Busy;
        };

        let ticket = match validate(&form, &self.policy) {
            Ok(ticket) => ticket,
            Err(message) => {
                self.form.reject(message.clone());
                return SubmitOutcome::Invalid(message);
            }
        };

        tracing::debug!(title = %ticket.title, "submitting ticket");
        match bounded(self.timeout, self.service.create_ticket(&ticket)).await {
            Ok(created) => {
                tracing::info!(id = created.id, "ticket created");
                let session = self.form.complete_submit(SUCCESS_MESSAGE);
                self.invalidation.raise();
                self.schedule_success_expiry(session);
                SubmitOutcome::Created(created)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ticket creation failed");
                let message = failure_message(&e);
                self.form.reject(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn schedule_success_expiry(&self, session: u64) {
        let form = self.form.clone();
        let delay = self.policy.success_message;
        let close = self.policy.close_on_success;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            form.expire_success(session, close);
        });
    }

    /// Explicit form reset.
    pub fn reset(&self) {
        self.form.reset();
    }

    /// Close the form; pending classification results are ignored.
    pub fn close(&self) {
        self.form.close();
    }
}
