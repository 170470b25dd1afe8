use rollcall::{
    records::{Notice, NoticeDraft, Student, StudentDraft},
    store::{InMemoryRecordStore, RecordStore, StoreError},
};

fn student_draft(name: &str, roll: &str) -> StudentDraft {
    StudentDraft {
        name: name.to_string(),
        roll: roll.to_string(),
        class_label: "9".to_string(),
        ..StudentDraft::default()
    }
}

#[tokio::test]
async fn given_created_records_when_listed_then_each_has_a_distinct_store_id() {
    let store = InMemoryRecordStore::<Student>::default();

    let alice = store
        .create(student_draft("Alice", "01"))
        .await
        .expect("create should succeed");
    let bob = store
        .create(student_draft("Bob", "02"))
        .await
        .expect("create should succeed");

    assert_ne!(alice.id, bob.id);
    let listed = store.fetch_all().await.expect("fetch should succeed");
    assert_eq!(listed, vec![alice, bob]);
    assert_eq!(store.mutation_calls(), 2);
    assert_eq!(store.fetch_calls(), 1);
}

#[tokio::test]
async fn given_unknown_id_when_updated_or_deleted_then_not_found() {
    let store = InMemoryRecordStore::<Student>::default();

    let err = store
        .update("missing", student_draft("Alice", "01"))
        .await
        .expect_err("update of unknown id should fail");
    assert!(err.is_not_found());

    let err = store
        .delete("missing")
        .await
        .expect_err("delete of unknown id should fail");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn given_update_when_applied_then_record_is_replaced_in_place() {
    let store = InMemoryRecordStore::<Student>::default();
    let alice = store
        .create(student_draft("Alice", "01"))
        .await
        .expect("create should succeed");
    store
        .create(student_draft("Bob", "02"))
        .await
        .expect("create should succeed");

    let renamed = store
        .update(&alice.id, student_draft("Alicia", "01"))
        .await
        .expect("update should succeed");
    assert_eq!(renamed.id, alice.id);

    let names: Vec<_> = store
        .snapshot()
        .await
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names, vec!["Alicia", "Bob"]);
}

#[tokio::test]
async fn given_queued_failure_when_called_then_it_is_consumed_once() {
    let store = InMemoryRecordStore::<Notice>::default();
    store
        .fail_next(StoreError::Transport {
            kind: rollcall::records::RecordKind::Notices,
            status: Some(503),
            message: "maintenance".to_string(),
        })
        .await;

    let err = store.fetch_all().await.expect_err("queued failure should surface");
    assert!(err.is_retryable());
    store.fetch_all().await.expect("second call should succeed");
}

#[tokio::test]
async fn given_blank_notice_when_created_then_validation_lists_fields() {
    let store = InMemoryRecordStore::<Notice>::default();

    let err = store
        .create(NoticeDraft::default())
        .await
        .expect_err("blank notice should fail");
    match err {
        StoreError::Validation { fields, .. } => {
            assert_eq!(fields, vec!["content".to_string(), "title".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn given_created_notice_then_it_is_dated() {
    let store = InMemoryRecordStore::<Notice>::default();
    let notice = store
        .create(NoticeDraft {
            title: "Exam routine".to_string(),
            content: "Annual exams start on 1 December.".to_string(),
        })
        .await
        .expect("create should succeed");
    assert!(notice.date.is_some());
}
