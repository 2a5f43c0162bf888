use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::error::Result;
use crate::session::DeskSession;
use crate::sync::ClassifyOutcome;

/// Ask the classifier for a category and priority
pub async fn cmd_classify(description: &str, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let min_chars = config.classify_min_chars;
    let session = DeskSession::connect(config)?;
    let creation = session.creation();
    creation.form().set_description(description);

    let output = match creation.description_blurred().await {
        ClassifyOutcome::Applied { suggestion, .. } => CommandOutput::new(json!(suggestion))
            .with_text(format!(
                "{} {}\n{} {}",
                "Category:".cyan(),
                suggestion.suggested_category.label(),
                "Priority:".cyan(),
                suggestion.suggested_priority.label()
            )),
        ClassifyOutcome::Skipped => CommandOutput::new(json!(null)).with_text(format!(
            "Description too short to classify (minimum {min_chars} characters)"
        )),
        _ => CommandOutput::new(json!(null)).with_text("No suggestion available"),
    };
    output.print(output_json)
}
