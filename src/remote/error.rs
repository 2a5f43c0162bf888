//! Error mapping for ticket service responses.
//!
//! The service reports validation problems as a JSON object keyed by field
//! name, where each value is either a list of messages or a single message.
//! Everything else that is not a success becomes a `ServerFailure`.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::TicketDeskError;

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    Many(Vec<Value>),
    One(Value),
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, messages: Vec<String>) {
        self.entries.push((field.into(), messages));
    }

    /// Parse a structured error body. Returns `None` unless the body is a
    /// non-empty JSON object.
    pub fn from_body(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        let object = value.as_object()?;
        if object.is_empty() {
            return None;
        }

        let mut errors = FieldErrors::new();
        for (field, raw) in object {
            let messages = match FieldMessages::deserialize(raw.clone()).ok()? {
                FieldMessages::Many(items) => items.iter().map(message_text).collect(),
                FieldMessages::One(item) => vec![message_text(&item)],
            };
            errors.push(field.clone(), messages);
        }
        errors.entries.sort_by(|a, b| a.0.cmp(&b.0));
        Some(errors)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders as `field: m1, m2; field2: m3`.
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .entries
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

/// Map a non-success response to the error taxonomy.
pub fn error_from_response(status: reqwest::StatusCode, body: &str) -> TicketDeskError {
    if status.is_client_error()
        && let Some(errors) = FieldErrors::from_body(body)
    {
        return TicketDeskError::ValidationFailure(errors);
    }

    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown").to_string()
    } else {
        body.trim().chars().take(200).collect()
    };
    TicketDeskError::ServerFailure {
        status: status.as_u16(),
        message,
    }
}

/// Map a transport error, folding timeouts into `NetworkFailure`.
pub fn error_from_transport(error: reqwest::Error) -> TicketDeskError {
    if error.is_timeout() {
        return TicketDeskError::NetworkFailure("request timed out".to_string());
    }
    if error.is_connect() || error.is_request() {
        return TicketDeskError::NetworkFailure(error.to_string());
    }
    if error.is_decode() {
        return TicketDeskError::ServerFailure {
            status: error.status().map(|s| s.as_u16()).unwrap_or(200),
            message: format!("unreadable response: {error}"),
        };
    }
    TicketDeskError::Http(error)
}
