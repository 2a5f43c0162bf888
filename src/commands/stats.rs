use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::display::format_stats;
use crate::error::{Result, TicketDeskError};
use crate::session::DeskSession;
use crate::sync::stats::STATS_ERROR_MESSAGE;

/// Show aggregate ticket statistics
pub async fn cmd_stats(output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let session = DeskSession::connect(config)?;
    let view = session.stats();
    view.refresh().await;

    match view.snapshot().stats {
        Some(stats) => CommandOutput::new(json!(stats))
            .with_text(format_stats(&stats))
            .print(output_json),
        None => Err(TicketDeskError::ViewFailure(STATS_ERROR_MESSAGE.to_string())),
    }
}
