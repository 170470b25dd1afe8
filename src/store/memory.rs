use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    records::StoredRecord,
    store::{
        error::{StoreError, not_found},
        ports::{RecordStore, validate_draft},
    },
};

/// Process-local store with the same contract as the HTTP store. Failures can
/// be queued to exercise error paths; each queued failure is consumed by the
/// next call of any kind.
pub struct InMemoryRecordStore<R> {
    records: Mutex<Vec<R>>,
    queued_failures: Mutex<VecDeque<StoreError>>,
    fetch_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
}

impl<R: StoredRecord> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl<R: StoredRecord> InMemoryRecordStore<R> {
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            queued_failures: Mutex::new(VecDeque::new()),
            fetch_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
        }
    }

    pub async fn fail_next(&self, err: StoreError) {
        self.queued_failures.lock().await.push_back(err);
    }

    pub async fn snapshot(&self) -> Vec<R> {
        self.records.lock().await.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    async fn take_failure(&self) -> Result<(), StoreError> {
        match self.queued_failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<R: StoredRecord> RecordStore<R> for InMemoryRecordStore<R> {
    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure().await?;
        Ok(self.records.lock().await.clone())
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure().await?;
        validate_draft::<R>(&draft)?;

        let record = R::from_draft(Uuid::now_v7().to_string(), draft);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: R::Draft) -> Result<R, StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure().await?;
        validate_draft::<R>(&patch)?;

        let mut records = self.records.lock().await;
        let slot = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found(R::KIND, id))?;
        *slot = R::from_draft(id.to_string(), patch);
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure().await?;

        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Err(not_found(R::KIND, id));
        }
        Ok(())
    }
}
