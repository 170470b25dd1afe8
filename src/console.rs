use std::sync::Arc;

use crate::{
    records::Record,
    session::{SessionError, SessionProvider, StaffUser},
    view::{
        CriteriaPatch, DerivedView, Facets, LoadOutcome, Mutation, MutationOutcome, SortKey,
        ViewError, ViewModel, ViewState,
    },
};

/// Protected boundary around a view model: reads pass through, writes need a
/// signed-in staff member.
pub struct StaffConsole<R: Record> {
    view_model: Arc<ViewModel<R>>,
    session: Arc<dyn SessionProvider>,
}

impl<R: Record> StaffConsole<R> {
    pub fn new(view_model: Arc<ViewModel<R>>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            view_model,
            session,
        }
    }

    pub fn view_model(&self) -> &ViewModel<R> {
        &self.view_model
    }

    pub fn current_user(&self) -> Option<StaffUser> {
        self.session.current_user()
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.session.sign_out().await
    }

    fn authorize(&self, action: &'static str) -> Result<StaffUser, ViewError> {
        let Some(user) = self.session.current_user() else {
            tracing::warn!(
                target: "console",
                kind = %R::KIND,
                action = action,
                "mutation_refused_without_session"
            );
            return Err(ViewError::Unauthenticated {
                kind: R::KIND,
                action,
            });
        };
        tracing::info!(
            target: "console",
            kind = %R::KIND,
            action = action,
            uid = %user.uid,
            "staff_mutation_requested"
        );
        Ok(user)
    }

    pub async fn load(&self) -> Result<LoadOutcome, ViewError> {
        self.view_model.load().await
    }

    pub fn set_criteria(&self, patch: CriteriaPatch) {
        self.view_model.set_criteria(patch);
    }

    pub fn set_sort(&self, key: SortKey) -> Result<(), ViewError> {
        self.view_model.set_sort(key)
    }

    pub fn view(&self) -> DerivedView<R> {
        self.view_model.view()
    }

    pub fn state(&self) -> ViewState {
        self.view_model.state()
    }

    pub fn facets(&self) -> Facets {
        self.view_model.facets()
    }

    pub async fn mutate(&self, mutation: Mutation<R>) -> Result<MutationOutcome<R>, ViewError> {
        let action = match &mutation {
            Mutation::Create(_) => "create",
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
        };
        self.authorize(action)?;
        self.view_model.mutate(mutation).await
    }

    pub async fn create(&self, draft: R::Draft) -> Result<R, ViewError> {
        self.authorize("create")?;
        self.view_model.create(draft).await
    }

    pub async fn update(&self, id: &str, patch: R::Draft) -> Result<R, ViewError> {
        self.authorize("update")?;
        self.view_model.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ViewError> {
        self.authorize("delete")?;
        self.view_model.delete(id).await
    }
}
