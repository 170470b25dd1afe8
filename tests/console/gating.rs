use std::sync::Arc;

use async_trait::async_trait;
use rollcall::{
    console::StaffConsole,
    records::{RecordKind, Teacher, TeacherDraft},
    session::{SessionError, SessionProvider, StaffUser, StaticSession},
    store::InMemoryRecordStore,
    view::{CriteriaPatch, Mutation, SortKey, ViewError, ViewModel, ViewState},
};

fn teacher(id: &str, name: &str, department: &str) -> Teacher {
    Teacher {
        id: id.to_string(),
        name: name.to_string(),
        designation: "Lecturer".to_string(),
        department: department.to_string(),
        email: None,
        phone: None,
        qualification: None,
        joining_date: None,
        experience_years: None,
        photo: None,
    }
}

fn draft(name: &str) -> TeacherDraft {
    TeacherDraft {
        name: name.to_string(),
        designation: "Assistant Teacher".to_string(),
        department: "Science".to_string(),
        ..TeacherDraft::default()
    }
}

fn console_with(
    session: Arc<dyn SessionProvider>,
) -> (Arc<InMemoryRecordStore<Teacher>>, StaffConsole<Teacher>) {
    let store = Arc::new(InMemoryRecordStore::with_records(vec![
        teacher("t1", "Rahim", "Science"),
        teacher("t2", "Nadia", "Arts"),
    ]));
    let view_model = Arc::new(ViewModel::<Teacher>::new(store.clone()));
    (store, StaffConsole::new(view_model, session))
}

#[tokio::test]
async fn given_no_signed_in_user_when_mutating_then_unauthenticated_and_store_untouched() {
    let (store, console) = console_with(Arc::new(StaticSession::anonymous()));
    console.load().await.expect("reads pass through without a session");
    console.set_criteria(CriteriaPatch::category("Science"));

    let err = console
        .create(draft("Karim"))
        .await
        .expect_err("create needs a session");
    assert_eq!(
        err,
        ViewError::Unauthenticated {
            kind: RecordKind::Teachers,
            action: "create"
        }
    );
    let err = console
        .delete("t1")
        .await
        .expect_err("delete needs a session");
    assert!(matches!(err, ViewError::Unauthenticated { action: "delete", .. }));
    let err = console
        .mutate(Mutation::Update {
            id: "t1".to_string(),
            patch: draft("Rahim Uddin"),
        })
        .await
        .expect_err("update needs a session");
    assert!(matches!(err, ViewError::Unauthenticated { action: "update", .. }));

    assert_eq!(store.mutation_calls(), 0);
    assert_eq!(console.view().items.len(), 1);
}

#[tokio::test]
async fn given_signed_in_user_when_mutating_then_calls_reach_the_view_model() {
    let session = Arc::new(StaticSession::signed_in(
        StaffUser::new("u1").with_email("head@school.test"),
    ));
    let (store, console) = console_with(session);
    console.load().await.expect("load should succeed");
    console.set_criteria(CriteriaPatch::category("Science"));
    console
        .set_sort(SortKey::ByCategory)
        .expect("teachers sort by department");

    let created = console
        .create(draft("Karim"))
        .await
        .expect("create should succeed");
    assert_eq!(console.view().items.len(), 2);

    console
        .update(&created.id, draft("Karim Ahmed"))
        .await
        .expect("update should succeed");
    console
        .delete("t1")
        .await
        .expect("delete should succeed");

    let names: Vec<_> = console
        .view()
        .items
        .into_iter()
        .map(|teacher| teacher.name)
        .collect();
    assert_eq!(names, vec!["Karim Ahmed"]);
    assert_eq!(store.mutation_calls(), 3);
    assert_eq!(console.state(), ViewState::Ready);
}

#[tokio::test]
async fn given_sign_out_then_later_mutations_are_refused() {
    let session = Arc::new(StaticSession::signed_in(StaffUser::new("u1")));
    let (_store, console) = console_with(session.clone());

    assert!(console.current_user().is_some());
    console.sign_out().await.expect("sign-out should succeed");
    assert!(console.current_user().is_none());

    let err = console
        .create(draft("Karim"))
        .await
        .expect_err("signed out console refuses writes");
    assert!(matches!(err, ViewError::Unauthenticated { .. }));

    session.sign_in(StaffUser::new("u2"));
    console
        .create(draft("Karim"))
        .await
        .expect("signing back in restores writes");
}

#[tokio::test]
async fn teacher_sort_keys_exclude_identifier_and_score() {
    let (_store, console) = console_with(Arc::new(StaticSession::anonymous()));
    for key in [SortKey::ByIdentifier, SortKey::ByScoreDescending] {
        let err = console
            .set_sort(key)
            .expect_err("teachers have no roll or score");
        assert!(matches!(err, ViewError::UnsupportedSortKey { .. }));
    }
    assert_eq!(console.view_model().sort_key(), SortKey::ByName);
}

struct FailingSignOut;

#[async_trait]
impl SessionProvider for FailingSignOut {
    fn current_user(&self) -> Option<StaffUser> {
        Some(StaffUser::new("u1"))
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        Err(SessionError::SignOutFailed("identity provider offline".to_string()))
    }
}

#[tokio::test]
async fn given_provider_sign_out_failure_then_error_is_forwarded() {
    let (_store, console) = console_with(Arc::new(FailingSignOut));

    let err = console
        .sign_out()
        .await
        .expect_err("provider failure should surface");
    assert!(err.to_string().contains("offline"), "unexpected error: {err}");
    assert!(console.current_user().is_some());
}
