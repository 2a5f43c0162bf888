use crate::remote::error::FieldErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TicketDeskError {
    #[error("network error: {0}")]
    NetworkFailure(String),

    #[error("{0}")]
    ValidationFailure(FieldErrors),

    #[error("server error ({status}): {message}")]
    ServerFailure { status: u16, message: String },

    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("invalid category '{0}'")]
    InvalidCategory(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    /// A user-facing message reported by one of the views.
    #[error("{0}")]
    ViewFailure(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse failure category exposed by the display surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkFailure,
    ValidationFailure,
    ServerFailure,
    ClassificationUnavailable,
    Other,
}

impl TicketDeskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TicketDeskError::NetworkFailure(_) | TicketDeskError::Http(_) => ErrorKind::NetworkFailure,
            TicketDeskError::ValidationFailure(_) => ErrorKind::ValidationFailure,
            TicketDeskError::ServerFailure { .. } | TicketDeskError::Json(_) => {
                ErrorKind::ServerFailure
            }
            TicketDeskError::ClassificationUnavailable(_) => ErrorKind::ClassificationUnavailable,
            _ => ErrorKind::Other,
        }
    }

    /// True for failures that came from the transport rather than the server.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            TicketDeskError::NetworkFailure(_) | TicketDeskError::Http(_)
        )
    }

    /// Structured per-field errors, if the server sent them.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            TicketDeskError::ValidationFailure(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TicketDeskError>;
