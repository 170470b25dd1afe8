use rollcall::{
    records::{ExamResult, Notice, ResultDraft, Student, StudentDraft, Teacher, TeacherDraft},
    store::{HttpRecordStore, RecordStore, StoreConfig, StoreError},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    body: String,
}

/// Serves exactly one response and hands back what the client sent.
async fn spawn_store_responder(
    status_line: &'static str,
    body: impl Into<String>,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let address = listener.local_addr().expect("local addr should exist");
    let (captured_tx, captured_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept should succeed");
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("response should be written");
        let _ = stream.shutdown().await;
        let _ = captured_tx.send(request);
    });

    (format!("http://{address}"), captured_rx)
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("request should be readable");
        assert!(read > 0, "client closed before sending headers");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = find_header_end(&buffer) {
            break position;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let read = stream.read(&mut chunk).await.expect("body should be readable");
        assert!(read > 0, "client closed before sending the body");
        buffer.extend_from_slice(&chunk[..read]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    CapturedRequest {
        method: request_line.next().unwrap_or_default().to_string(),
        path: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buffer[body_start..body_start + content_length]).to_string(),
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn result_draft() -> ResultDraft {
    let mut draft = ResultDraft {
        student_name: "Alice".to_string(),
        roll: "01".to_string(),
        class_label: "9".to_string(),
        subject: "Math".to_string(),
        exam_year: 2025,
        ..ResultDraft::default()
    };
    draft.set_score_input("85");
    draft
}

#[tokio::test]
async fn given_student_listing_when_fetched_then_records_decode_from_store_shape() {
    let (base_url, captured) = spawn_store_responder(
        "200 OK",
        r#"[{"_id":"s1","name":"Alice","roll":"01","class":"9","section":"A","__v":0},
            {"_id":"s2","name":"Bob","roll":"02","class":"9"}]"#,
    )
    .await;
    let store = HttpRecordStore::<Student>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    let students = store.fetch_all().await.expect("fetch should succeed");
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].section.as_deref(), Some("A"));
    assert_eq!(students[1].class_label, "9");

    let request = captured.await.expect("request should be captured");
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/api/students");
}

#[tokio::test]
async fn given_result_draft_when_created_then_marks_are_posted_and_record_returned() {
    let (base_url, captured) = spawn_store_responder(
        "201 Created",
        r#"{"_id":"r1","studentName":"Alice","roll":"01","class":"9","subject":"Math","marks":85,"year":2025,"examType":"annual"}"#,
    )
    .await;
    let store = HttpRecordStore::<ExamResult>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    let created = store
        .create(result_draft())
        .await
        .expect("create should succeed");
    assert_eq!(created.id, "r1");
    assert_eq!(created.score, 85);

    let request = captured.await.expect("request should be captured");
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/results");
    let posted: serde_json::Value =
        serde_json::from_str(&request.body).expect("posted body should be json");
    assert_eq!(posted["marks"], 85);
    assert_eq!(posted["studentName"], "Alice");
    assert!(posted.get("grade").is_none(), "grade is derived, never sent");
}

#[tokio::test]
async fn given_rejected_create_when_store_answers_400_then_validation_error_carries_message() {
    let (base_url, _captured) = spawn_store_responder(
        "400 Bad Request",
        r#"{"error":"Student validation failed: roll: duplicate"}"#,
    )
    .await;
    let store = HttpRecordStore::<Student>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    let err = store
        .create(StudentDraft {
            name: "Alice".to_string(),
            roll: "01".to_string(),
            class_label: "9".to_string(),
            ..StudentDraft::default()
        })
        .await
        .expect_err("400 should fail");
    match err {
        StoreError::Validation { ref message, .. } => {
            assert!(message.contains("duplicate"), "unexpected message: {message}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn given_missing_teacher_when_updated_then_not_found_names_the_id() {
    let (base_url, captured) =
        spawn_store_responder("404 Not Found", r#"{"error":"Teacher not found"}"#).await;
    let store = HttpRecordStore::<Teacher>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    let err = store
        .update(
            "t1",
            TeacherDraft {
                name: "Rahim".to_string(),
                designation: "Lecturer".to_string(),
                department: "Science".to_string(),
                ..TeacherDraft::default()
            },
        )
        .await
        .expect_err("404 should fail");
    assert!(err.is_not_found());
    assert!(err.to_string().contains("t1"), "unexpected error: {err}");

    let request = captured.await.expect("request should be captured");
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/api/teachers/t1");
}

#[tokio::test]
async fn given_notice_when_deleted_then_delete_targets_its_id() {
    let (base_url, captured) =
        spawn_store_responder("200 OK", r#"{"message":"Notice deleted successfully"}"#).await;
    let store = HttpRecordStore::<Notice>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    store.delete("n1").await.expect("delete should succeed");

    let request = captured.await.expect("request should be captured");
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.path, "/api/notices/n1");
}

#[tokio::test]
async fn given_server_error_when_fetching_then_transport_error_is_retryable() {
    let (base_url, _captured) =
        spawn_store_responder("500 Internal Server Error", r#"{"error":"db down"}"#).await;
    let store = HttpRecordStore::<ExamResult>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    let err = store.fetch_all().await.expect_err("500 should fail");
    assert!(matches!(err, StoreError::Transport { status: Some(500), .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn given_garbled_body_when_fetching_then_transport_error_keeps_status() {
    let (base_url, _captured) = spawn_store_responder("200 OK", "<html>oops</html>").await;
    let store = HttpRecordStore::<Student>::new(&StoreConfig::new(base_url))
        .expect("store should build");

    let err = store.fetch_all().await.expect_err("html should not decode");
    assert!(matches!(err, StoreError::Transport { status: Some(200), .. }));
}

#[tokio::test]
async fn given_base_url_with_prefix_when_fetching_then_api_path_is_appended() {
    let (base_url, captured) = spawn_store_responder("200 OK", "[]").await;
    let store = HttpRecordStore::<Notice>::new(&StoreConfig::new(format!("{base_url}/school/")))
        .expect("store should build");

    let notices = store.fetch_all().await.expect("fetch should succeed");
    assert!(notices.is_empty());

    let request = captured.await.expect("request should be captured");
    assert_eq!(request.path, "/school/api/notices");
}

#[tokio::test]
async fn given_invalid_draft_when_created_then_rejected_before_any_request() {
    // Nothing listens here; a request would surface as a transport error.
    let store = HttpRecordStore::<ExamResult>::new(&StoreConfig::new("http://127.0.0.1:9"))
        .expect("store should build");

    let mut draft = result_draft();
    draft.set_score_input("140");
    let err = store.create(draft).await.expect_err("out of range marks");
    match err {
        StoreError::Validation { fields, .. } => assert!(!fields.is_empty()),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_unreachable_store_when_fetching_then_transport_error_is_returned() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let address = listener.local_addr().expect("local addr should exist");
    drop(listener);

    let store = HttpRecordStore::<Student>::new(&StoreConfig {
        base_url: format!("http://{address}"),
        request_timeout_ms: 2_000,
    })
    .expect("store should build");

    let err = store.fetch_all().await.expect_err("closed port should fail");
    assert!(matches!(err, StoreError::Transport { status: None, .. }));
    assert!(err.is_retryable());
}

#[test]
fn non_http_base_url_is_rejected() {
    let err = HttpRecordStore::<Student>::new(&StoreConfig::new("ftp://records.school.test"))
        .err()
        .expect("ftp should be rejected");
    assert!(err.to_string().contains("ftp"), "unexpected error: {err}");
}
