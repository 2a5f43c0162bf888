use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::display::format_ticket_line;
use crate::error::{Result, TicketDeskError};
use crate::session::DeskSession;
use crate::sync::{ClassifyOutcome, SubmitOutcome};
use crate::types::{Category, Priority};

/// Options for creating a new ticket
pub struct CreateOptions {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    /// Ask the classifier to fill in category and priority first
    pub classify: bool,
    pub output_json: bool,
}

/// Create a ticket through the creation form.
///
/// Category and priority given on the command line count as manual choices
/// and are never replaced by a suggestion.
pub async fn cmd_create(options: CreateOptions) -> Result<()> {
    let config = Config::load()?;
    let session = DeskSession::connect(config)?;
    let creation = session.creation();
    let form = creation.form();

    form.set_title(options.title);
    form.set_description(options.description);
    if let Some(category) = options.category {
        form.select_category(Some(category));
    }
    if let Some(priority) = options.priority {
        form.select_priority(Some(priority));
    }

    let mut suggestion = None;
    if options.classify {
        match creation.description_blurred().await {
            ClassifyOutcome::Applied {
                suggestion: s,
                applied,
            } => {
                if !options.output_json && (applied.category || applied.priority) {
                    eprintln!(
                        "{} category: {}, priority: {}",
                        "Suggested".dimmed(),
                        s.suggested_category,
                        s.suggested_priority
                    );
                }
                suggestion = Some(s);
            }
            ClassifyOutcome::Unavailable => {
                if !options.output_json {
                    eprintln!("{}", "No classification suggestion available".dimmed());
                }
            }
            _ => {}
        }
    }

    match creation.submit().await {
        SubmitOutcome::Created(ticket) => {
            let text = format!(
                "{}\n{}",
                form.snapshot()
                    .success_message
                    .unwrap_or_default()
                    .green(),
                format_ticket_line(&ticket)
            );
            CommandOutput::new(json!({
                "action": "created",
                "ticket": ticket,
                "suggestion": suggestion,
            }))
            .with_text(text)
            .print(options.output_json)
        }
        SubmitOutcome::Invalid(message) | SubmitOutcome::Failed(message) => {
            Err(TicketDeskError::ViewFailure(message))
        }
        SubmitOutcome::Busy => Err(TicketDeskError::ViewFailure(
            "A submission is already in progress".to_string(),
        )),
    }
}
