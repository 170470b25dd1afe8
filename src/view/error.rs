use thiserror::Error;

use crate::{records::RecordKind, store::StoreError, view::sort::SortKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("sort key '{key}' does not apply to {kind}")]
    UnsupportedSortKey { kind: RecordKind, key: SortKey },
    #[error("signing in is required to {action} {kind}")]
    Unauthenticated {
        kind: RecordKind,
        action: &'static str,
    },
}

impl ViewError {
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ViewError::Store(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_retryable)
    }
}
