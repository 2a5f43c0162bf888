//! Configuration commands for managing ticketdesk settings.
//!
//! - `config show`: Display the effective configuration
//! - `config get`: Print a single value
//! - `config set`: Set a value in the project-local file
//! - `config path`: Print the config file locations

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::{Config, VALID_CONFIG_KEYS};
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output_json: bool) -> Result<()> {
    let config = Config::load()?;

    let mut text = format!("{}\n\n", "Configuration:".cyan().bold());
    for key in VALID_CONFIG_KEYS {
        text.push_str(&format!("  {}: {}\n", key.cyan(), config.get(key)?));
    }
    text.push('\n');
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::local_path().display()).dimmed()
    ));

    let mut json_output = serde_json::to_value(&config)?;
    json_output["config_file"] = json!(Config::local_path().to_string_lossy());

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output_json)
}

/// Print a single configuration value
pub fn cmd_config_get(key: &str, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;
    CommandOutput::new(json!({ "key": key, "value": value }))
        .with_text(value)
        .print(output_json)
}

/// Set a configuration value
///
/// Environment overrides are not written back; only the stored file is
/// changed.
pub fn cmd_config_set(key: &str, value: &str, output_json: bool) -> Result<()> {
    let mut config = Config::load_stored()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), stored))
    .print(output_json)
}

/// Show where configuration is read from
pub fn cmd_config_path(output_json: bool) -> Result<()> {
    let local = Config::local_path();
    let user = Config::user_path();

    let mut text = format!("{}", local.display());
    if let Some(ref user) = user {
        text.push_str(&format!("\n{}", format!("{} (fallback)", user.display()).dimmed()));
    }

    CommandOutput::new(json!({
        "local": local.to_string_lossy(),
        "user": user.as_ref().map(|p| p.to_string_lossy()),
    }))
    .with_text(text)
    .print(output_json)
}
