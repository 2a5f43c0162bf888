use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::display::format_ticket_table;
use crate::error::{Result, TicketDeskError};
use crate::session::DeskSession;
use crate::sync::FilterCriteria;
use crate::sync::collection::LOAD_ERROR_MESSAGE;

/// List tickets matching the given filters
pub async fn cmd_ls(criteria: FilterCriteria, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let session = DeskSession::connect_with_filters(config, criteria)?;
    let collection = session.collection();
    collection.refresh().await;

    let state = collection.snapshot();
    if state.error.is_some() {
        return Err(TicketDeskError::ViewFailure(LOAD_ERROR_MESSAGE.to_string()));
    }

    let text = if state.tickets.is_empty() {
        collection.empty_message().to_string()
    } else {
        format_ticket_table(&state.tickets)
    };

    CommandOutput::new(json!(state.tickets))
        .with_text(text)
        .print(output_json)
}
