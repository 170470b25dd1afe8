use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::{
    records::{Record, RecordId},
    store::{RecordStore, StoreError},
    view::{
        criteria::{CriteriaPatch, FilterCriteria},
        error::ViewError,
        filter,
        sort::{self, SortKey},
        stats::{self, Facets, Stats},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// Gate closed, or nothing has been loaded yet.
    Empty,
    /// A fetch is in flight; the derived view keeps its last value.
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView<R> {
    pub items: Vec<R>,
    pub stats: Stats<R>,
}

impl<R: Record> DerivedView<R> {
    pub fn compute(canonical: &[R], criteria: &FilterCriteria, key: SortKey) -> Self {
        let mut items = filter::apply(canonical, criteria);
        sort::sort_in_place(&mut items, key);
        let stats = stats::summarize(&items);
        Self { items, stats }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { generation: u64, count: usize },
    /// A newer load was requested while this one was in flight.
    Superseded { generation: u64 },
}

pub enum Mutation<R: Record> {
    Create(R::Draft),
    Update { id: RecordId, patch: R::Draft },
    Delete { id: RecordId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<R> {
    Created(R),
    Updated(R),
    Deleted(RecordId),
}

/// A successful mutation as it was applied to the canonical collection.
#[derive(Debug, Clone)]
enum LocalChange<R> {
    Upsert(R),
    Remove(RecordId),
}

impl<R: Record> LocalChange<R> {
    fn apply_to(&self, canonical: &mut Vec<R>) {
        match self {
            LocalChange::Upsert(record) => {
                match canonical.iter().position(|existing| existing.id() == record.id()) {
                    Some(index) => canonical[index] = record.clone(),
                    None => canonical.push(record.clone()),
                }
            }
            LocalChange::Remove(id) => canonical.retain(|existing| existing.id() != id.as_str()),
        }
    }
}

struct ViewModelState<R> {
    canonical: Vec<R>,
    criteria: FilterCriteria,
    sort: SortKey,
    derived: DerivedView<R>,
    requested_generation: u64,
    settled_generation: u64,
    loaded: bool,
    last_error: Option<StoreError>,
    /// Bumped by every successful mutation.
    mutation_epoch: u64,
    /// Mutations applied while a load was in flight, replayed onto its snapshot.
    pending_changes: Vec<(u64, LocalChange<R>)>,
}

impl<R: Record> ViewModelState<R> {
    fn record_change(&mut self, change: LocalChange<R>) {
        change.apply_to(&mut self.canonical);
        self.mutation_epoch += 1;
        if self.settled_generation < self.requested_generation {
            self.pending_changes.push((self.mutation_epoch, change));
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.derived = DerivedView::compute(&self.canonical, &self.criteria, self.sort);
        tracing::debug!(
            target: "view",
            kind = %R::KIND,
            canonical = self.canonical.len(),
            visible = self.derived.items.len(),
            sort = %self.sort,
            "view_recomputed"
        );
    }
}

/// Holds one kind's canonical collection and the projection the presentation
/// layer renders. The lock is only taken between awaits.
pub struct ViewModel<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    state: Mutex<ViewModelState<R>>,
}

impl<R: Record> ViewModel<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        let criteria = FilterCriteria::default();
        let sort = SortKey::default();
        Self {
            store,
            state: Mutex::new(ViewModelState {
                derived: DerivedView::compute(&[], &criteria, sort),
                canonical: Vec::new(),
                criteria,
                sort,
                requested_generation: 0,
                settled_generation: 0,
                loaded: false,
                last_error: None,
                mutation_epoch: 0,
                pending_changes: Vec::new(),
            }),
        }
    }

    /// Like [`ViewModel::new`], starting from `key` when this kind supports it.
    pub fn with_preferred_sort(store: Arc<dyn RecordStore<R>>, key: SortKey) -> Self {
        let view_model = Self::new(store);
        if let Err(err) = view_model.set_sort(key) {
            tracing::debug!(
                target: "view",
                kind = %R::KIND,
                error = %err,
                "preferred_sort_ignored"
            );
        }
        view_model
    }

    fn lock(&self) -> MutexGuard<'_, ViewModelState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[tracing::instrument(name = "view_load", target = "view", skip(self), fields(kind = %R::KIND))]
    pub async fn load(&self) -> Result<LoadOutcome, ViewError> {
        let (generation, epoch_at_start) = {
            let mut state = self.lock();
            state.requested_generation += 1;
            (state.requested_generation, state.mutation_epoch)
        };

        let fetched = self.store.fetch_all().await;

        let mut state = self.lock();
        if generation != state.requested_generation {
            tracing::debug!(
                target: "view",
                kind = %R::KIND,
                generation = generation,
                latest = state.requested_generation,
                succeeded = fetched.is_ok(),
                "stale_load_discarded"
            );
            return Ok(LoadOutcome::Superseded { generation });
        }
        state.settled_generation = generation;
        let pending = std::mem::take(&mut state.pending_changes);

        match fetched {
            Ok(mut records) => {
                let replayed: Vec<_> = pending
                    .into_iter()
                    .filter(|(epoch, _)| *epoch > epoch_at_start)
                    .collect();
                if !replayed.is_empty() {
                    tracing::debug!(
                        target: "view",
                        kind = %R::KIND,
                        generation = generation,
                        replayed = replayed.len(),
                        "mutations_replayed_onto_load"
                    );
                }
                for (_, change) in &replayed {
                    change.apply_to(&mut records);
                }
                let count = records.len();
                state.canonical = records;
                state.loaded = true;
                state.last_error = None;
                state.recompute();
                Ok(LoadOutcome::Applied { generation, count })
            }
            Err(err) => {
                tracing::warn!(
                    target: "view",
                    kind = %R::KIND,
                    generation = generation,
                    retryable = err.is_retryable(),
                    error = %err,
                    "load_failed"
                );
                state.last_error = Some(err.clone());
                Err(err.into())
            }
        }
    }

    pub fn set_criteria(&self, patch: CriteriaPatch) {
        let mut state = self.lock();
        state.criteria.apply(patch);
        state.recompute();
    }

    pub fn set_sort(&self, key: SortKey) -> Result<(), ViewError> {
        if !R::DESCRIPTOR.supports(key) {
            return Err(ViewError::UnsupportedSortKey { kind: R::KIND, key });
        }
        let mut state = self.lock();
        state.sort = key;
        state.recompute();
        Ok(())
    }

    pub async fn mutate(&self, mutation: Mutation<R>) -> Result<MutationOutcome<R>, ViewError> {
        match mutation {
            Mutation::Create(draft) => self.create(draft).await.map(MutationOutcome::Created),
            Mutation::Update { id, patch } => {
                self.update(&id, patch).await.map(MutationOutcome::Updated)
            }
            Mutation::Delete { id } => {
                self.delete(&id).await?;
                Ok(MutationOutcome::Deleted(id))
            }
        }
    }

    #[tracing::instrument(name = "view_create", target = "view", skip(self, draft), fields(kind = %R::KIND))]
    pub async fn create(&self, draft: R::Draft) -> Result<R, ViewError> {
        let created = self
            .store
            .create(draft)
            .await
            .inspect_err(|err| log_mutation_failure::<R>("create", None, err))?;

        self.lock().record_change(LocalChange::Upsert(created.clone()));
        Ok(created)
    }

    #[tracing::instrument(name = "view_update", target = "view", skip(self, patch), fields(kind = %R::KIND))]
    pub async fn update(&self, id: &str, patch: R::Draft) -> Result<R, ViewError> {
        let updated = self
            .store
            .update(id, patch)
            .await
            .inspect_err(|err| log_mutation_failure::<R>("update", Some(id), err))?;

        // Upsert: a racing delete may have removed it locally while the store kept it.
        self.lock().record_change(LocalChange::Upsert(updated.clone()));
        Ok(updated)
    }

    #[tracing::instrument(name = "view_delete", target = "view", skip(self), fields(kind = %R::KIND))]
    pub async fn delete(&self, id: &str) -> Result<(), ViewError> {
        self.store
            .delete(id)
            .await
            .inspect_err(|err| log_mutation_failure::<R>("delete", Some(id), err))?;

        self.lock().record_change(LocalChange::Remove(id.to_string()));
        Ok(())
    }

    pub fn view(&self) -> DerivedView<R> {
        self.lock().derived.clone()
    }

    pub fn state(&self) -> ViewState {
        let state = self.lock();
        if state.settled_generation < state.requested_generation {
            ViewState::Loading
        } else if !state.loaded || !state.criteria.gate_open() {
            ViewState::Empty
        } else {
            ViewState::Ready
        }
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.lock().criteria.clone()
    }

    pub fn sort_key(&self) -> SortKey {
        self.lock().sort
    }

    pub fn canonical(&self) -> Vec<R> {
        self.lock().canonical.clone()
    }

    pub fn facets(&self) -> Facets {
        stats::facets(&self.lock().canonical)
    }

    /// Error of the most recent settled load, cleared by the next success.
    pub fn last_error(&self) -> Option<StoreError> {
        self.lock().last_error.clone()
    }
}

fn log_mutation_failure<R: Record>(operation: &'static str, id: Option<&str>, err: &StoreError) {
    tracing::warn!(
        target: "view",
        kind = %R::KIND,
        operation = operation,
        id = id.unwrap_or_default(),
        retryable = err.is_retryable(),
        error = %err,
        "mutation_failed"
    );
}
