use async_trait::async_trait;
use validator::Validate;

use crate::{
    records::StoredRecord,
    store::error::{StoreError, invalid_draft},
};

/// Minimal transport over the record API: single-shot calls, no caching and
/// no retry. Callers decide whether a failure is worth repeating.
#[async_trait]
pub trait RecordStore<R: StoredRecord>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<R>, StoreError>;

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;

    /// Full-object replace of the record stored under `id`.
    async fn update(&self, id: &str, patch: R::Draft) -> Result<R, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub fn validate_draft<R: StoredRecord>(draft: &R::Draft) -> Result<(), StoreError> {
    draft
        .validate()
        .map_err(|errors| invalid_draft(R::KIND, &errors))
}
