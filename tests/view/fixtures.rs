use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use rollcall::{
    records::{ExamResult, Student, StoredRecord, Teacher},
    store::{InMemoryRecordStore, RecordStore, StoreError},
};
use tokio::sync::{Mutex, oneshot};

pub fn result(id: &str, name: &str, class: &str, subject: &str, score: i64) -> ExamResult {
    ExamResult {
        id: id.to_string(),
        student_name: name.to_string(),
        roll: format!("{id:0>2}"),
        class_label: class.to_string(),
        subject: subject.to_string(),
        score,
        exam_year: 2025,
        exam_type: Some("annual".to_string()),
    }
}

pub fn student(id: &str, name: &str, roll: &str, class: &str) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        roll: roll.to_string(),
        class_label: class.to_string(),
        section: None,
        email: None,
        phone: None,
        address: None,
        photo: None,
    }
}

pub fn teacher(id: &str, name: &str, department: &str, designation: &str) -> Teacher {
    Teacher {
        id: id.to_string(),
        name: name.to_string(),
        designation: designation.to_string(),
        department: department.to_string(),
        email: None,
        phone: None,
        qualification: None,
        joining_date: None,
        experience_years: None,
        photo: None,
    }
}

/// Alice 85 and Bob 60 in class 9, Cara 90 in class 10.
pub fn scenario_results() -> Vec<ExamResult> {
    vec![
        result("1", "Bob", "9", "Math", 60),
        result("2", "Alice", "9", "Math", 85),
        result("3", "Cara", "10", "Math", 90),
    ]
}

type Gate<R> = oneshot::Receiver<Result<Vec<R>, StoreError>>;

/// Store whose fetches block until the test releases them, in any order.
/// Mutations go straight through to an in-memory backing store.
pub struct GatedStore<R> {
    gates: Mutex<VecDeque<Gate<R>>>,
    arrivals: AtomicUsize,
    backing: InMemoryRecordStore<R>,
}

impl<R: StoredRecord> GatedStore<R> {
    pub fn new() -> Self {
        Self {
            gates: Mutex::new(VecDeque::new()),
            arrivals: AtomicUsize::new(0),
            backing: InMemoryRecordStore::default(),
        }
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            backing: InMemoryRecordStore::with_records(records),
            ..Self::new()
        }
    }

    pub async fn stored(&self) -> Vec<R> {
        self.backing.snapshot().await
    }

    /// Arms the next fetch; send on the returned handle to complete it.
    pub async fn arm(&self) -> oneshot::Sender<Result<Vec<R>, StoreError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push_back(rx);
        tx
    }

    pub async fn wait_for_arrivals(&self, expected: usize) {
        while self.arrivals.load(Ordering::SeqCst) < expected {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl<R: StoredRecord> RecordStore<R> for GatedStore<R> {
    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        let gate = self
            .gates
            .lock()
            .await
            .pop_front()
            .expect("a gate should be armed for every fetch");
        self.arrivals.fetch_add(1, Ordering::SeqCst);
        gate.await.expect("gate sender should stay alive")
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        self.backing.create(draft).await
    }

    async fn update(&self, id: &str, patch: R::Draft) -> Result<R, StoreError> {
        self.backing.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.backing.delete(id).await
    }
}
