use thiserror::Error;
use validator::ValidationErrors;

use crate::records::{RecordId, RecordKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} request failed{}: {message}", status_suffix(.status))]
    Transport {
        kind: RecordKind,
        status: Option<u16>,
        message: String,
    },
    #[error("{kind} payload rejected: {message}")]
    Validation {
        kind: RecordKind,
        fields: Vec<String>,
        message: String,
    },
    #[error("{kind} record '{id}' no longer exists")]
    NotFound { kind: RecordKind, id: RecordId },
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|status| format!(" (status {status})"))
        .unwrap_or_default()
}

impl StoreError {
    pub fn kind(&self) -> RecordKind {
        match self {
            StoreError::Transport { kind, .. }
            | StoreError::Validation { kind, .. }
            | StoreError::NotFound { kind, .. } => *kind,
        }
    }

    /// Only transport failures are worth retrying as-is. Validation needs a
    /// corrected payload and not-found needs a reload.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transport { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub fn transport(kind: RecordKind, message: impl Into<String>) -> StoreError {
    StoreError::Transport {
        kind,
        status: None,
        message: message.into(),
    }
}

pub fn transport_status(kind: RecordKind, status: u16, message: impl Into<String>) -> StoreError {
    StoreError::Transport {
        kind,
        status: Some(status),
        message: message.into(),
    }
}

pub fn rejected(kind: RecordKind, message: impl Into<String>) -> StoreError {
    StoreError::Validation {
        kind,
        fields: Vec::new(),
        message: message.into(),
    }
}

pub fn not_found(kind: RecordKind, id: impl Into<RecordId>) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.into(),
    }
}

pub fn invalid_draft(kind: RecordKind, errors: &ValidationErrors) -> StoreError {
    let mut entries = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let reason = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            (field.to_string(), reason)
        })
        .collect::<Vec<_>>();
    entries.sort();

    let message = entries
        .iter()
        .map(|(_, reason)| reason.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    StoreError::Validation {
        kind,
        fields: entries.into_iter().map(|(field, _)| field).collect(),
        message,
    }
}
