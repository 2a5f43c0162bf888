//! Ticket service collaborator.
//!
//! This module defines the seam between the synchronization engine and the
//! remote ticket store: the `TicketService` trait, the request payloads it
//! accepts, and the reqwest-backed implementation of the REST contract.

pub mod error;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sync::filter::FilterCriteria;
use crate::types::{Category, ClassificationSuggestion, Priority, Status, Ticket, TicketId, TicketStats};

pub use error::FieldErrors;
pub use http::HttpTicketService;

/// Payload for creating a ticket. Category and priority are omitted when
/// absent so the service can apply its defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Partial update applied with PATCH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TicketUpdate {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

/// The remote, authoritative ticket store.
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Tickets matching every non-empty criterion, newest first.
    async fn list_tickets(&self, criteria: &FilterCriteria) -> Result<Vec<Ticket>>;

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket>;

    async fn update_ticket(&self, id: TicketId, update: &TicketUpdate) -> Result<Ticket>;

    async fn fetch_stats(&self) -> Result<TicketStats>;

    /// Suggested category and priority for a description. Every failure is
    /// reported as `ClassificationUnavailable`.
    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion>;
}
