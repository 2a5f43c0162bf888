use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::error::{Result, TicketDeskError};
use crate::session::DeskSession;
use crate::sync::MutationOutcome;
use crate::types::{Status, TicketId};

/// Set a ticket's status
pub async fn cmd_status(id: TicketId, status: Status, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let session = DeskSession::connect(config)?;
    let collection = session.collection();

    collection.refresh().await;
    let previous = collection.snapshot().ticket(id).map(|t| t.status);

    match collection.set_status(id, status).await {
        MutationOutcome::Confirmed(ticket) => {
            let from = previous.map(|s| s.to_string());
            CommandOutput::new(json!({
                "id": ticket.id,
                "action": "status_changed",
                "previous_status": from,
                "new_status": ticket.status,
            }))
            .with_text(format!("Updated #{} -> {}", ticket.id, ticket.status.label()))
            .print(output_json)
        }
        MutationOutcome::Reverted => {
            let shown = collection
                .snapshot()
                .ticket(id)
                .map(|t| t.status.label())
                .unwrap_or("unknown");
            Err(TicketDeskError::ViewFailure(format!(
                "Failed to update ticket #{id}; status is still {shown}"
            )))
        }
    }
}
