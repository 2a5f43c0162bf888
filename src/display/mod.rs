use crate::types::{Priority, Status};
use owo_colors::OwoColorize;

pub mod cli_formatting;
pub mod data_formatting;

pub use cli_formatting::*;
pub use data_formatting::*;

pub fn format_status_colored(status: Status) -> String {
    let badge = format!("[{}]", status.label());
    match status {
        Status::Open => badge.yellow().to_string(),
        Status::InProgress => badge.cyan().to_string(),
        Status::Resolved => badge.green().to_string(),
        Status::Closed => badge.dimmed().to_string(),
    }
}

pub fn format_priority_colored(priority: Priority) -> String {
    let badge = format!("[{}]", priority);
    match priority {
        Priority::Critical => badge.red().bold().to_string(),
        Priority::High => badge.red().to_string(),
        Priority::Medium => badge.yellow().to_string(),
        Priority::Low => badge,
    }
}
