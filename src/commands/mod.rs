//! One module per CLI command. Each command is a thin driver over a
//! `DeskSession`.

mod classify;
mod config;
pub mod create;
mod ls;
mod stats;
mod status;
mod watch;

pub use classify::cmd_classify;
pub use config::{cmd_config_get, cmd_config_path, cmd_config_set, cmd_config_show};
pub use create::{CreateOptions, cmd_create};
pub use ls::cmd_ls;
pub use stats::cmd_stats;
pub use status::cmd_status;
pub use watch::cmd_watch;

use serde_json::Value;

use crate::error::Result;

/// Output of a command in both machine and human form.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when asked, otherwise the text form (or JSON if there is
    /// no text form).
    pub fn print(self, output_json: bool) -> Result<()> {
        match self.text {
            Some(text) if !output_json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
