//! End-to-end tests against a mock generation and store service.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use timetabler::config::ClientConfig;
use timetabler::generation::{GenerationClient, GenerationSession, ResourceSetup, TimetableError};
use timetabler::grid::{PeriodEntry, ResourceKind};
use timetabler::load::{FacultyInput, RawPeriodEntry};
use timetabler::store::{StoreClient, StoreError};

#[derive(Default)]
struct MockState {
    timetables: Mutex<Vec<Value>>,
    saved_by: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
}

fn period(subject: &str, faculty: &str, room: &str, batch: &str, is_lab: bool) -> Value {
    json!({
        "subject": subject,
        "faculty": faculty,
        "class_name": "BE",
        "room": room,
        "batch": batch,
        "is_lab": is_lab
    })
}

fn success_body(request: &Value) -> Value {
    let lecture = period("DB", "Rao", "C1", "Full Class", false);
    let lab = period("DB Lab", "Rao", "Lab 1", "Batch 1", true);
    json!({
        "class_timetable": {"BE": [[lecture, "Free", lab, lab], [lecture, ""]]},
        "teacher_timetable": {"Rao": [[lecture, null, lab, lab], [lecture]]},
        "lab_timetable": {"Lab 1": [["Free", "Free", lab, lab]]},
        "classroom_timetable": {"C1": [[lecture], [lecture]]},
        "faculty": request["faculty"],
        "title": request["title"],
        "workingDays": request["workingDays"],
        "periods": request["periods"]
    })
}

async fn generate(Json(request): Json<Value>) -> Response {
    match request["title"].as_str().unwrap_or_default() {
        "error" => Json(json!({
            "status": "ERROR",
            "message": "Class BE requires 50 periods but only 40 periods are available.",
            "error_type": "INPUT_VALIDATION_FAILED"
        }))
        .into_response(),
        "infeasible" => Json(json!({
            "status": "INFEASIBLE",
            "message": "No feasible solution exists with the given constraints."
        }))
        .into_response(),
        "bad-gateway" => (StatusCode::BAD_GATEWAY, "<html>upstream down</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(success_body(&request)).into_response()
        }
        _ => Json(success_body(&request)).into_response(),
    }
}

async fn add(State(state): State<Arc<MockState>>, Json(mut doc): Json<Value>) -> Json<Value> {
    let id = format!("id{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    doc["_id"] = json!(id);
    record_user(&state, &doc);
    doc["createdAt"] = json!("2024-07-01T10:00:00.000000+05:30");
    if let Some(faculty) = doc.as_object_mut().and_then(|o| o.remove("faculty")) {
        doc["teacherData"] = faculty;
    }
    state.timetables.lock().unwrap().insert(0, doc.clone());
    Json(doc)
}

async fn update(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(doc): Json<Value>,
) -> Response {
    record_user(&state, &doc);
    let mut timetables = state.timetables.lock().unwrap();
    match timetables.iter_mut().find(|t| t["_id"] == json!(id)) {
        Some(stored) => {
            stored["title"] = doc["title"].clone();
            stored["class_timetable"] = doc["class_timetable"].clone();
            Json(stored.clone()).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Timetable not found"})),
        )
            .into_response(),
    }
}

fn record_user(state: &MockState, doc: &Value) {
    let user = doc["userId"].as_str().unwrap_or_default().to_string();
    state.saved_by.lock().unwrap().push(user);
}

async fn list(State(state): State<Arc<MockState>>, Path(_user): Path<String>) -> Json<Value> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(state.timetables.lock().unwrap().clone()))
}

async fn remove(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Json<Value> {
    let mut timetables = state.timetables.lock().unwrap();
    let before = timetables.len();
    timetables.retain(|t| t["_id"] != json!(id));
    if timetables.len() < before {
        Json(json!({"message": "Deleted"}))
    } else {
        Json(json!({"message": "Not Found"}))
    }
}

async fn spawn_service() -> (ClientConfig, Arc<MockState>) {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/generate", post(generate))
        .route("/add", post(add))
        .route("/update-timetable/:id", put(update))
        .route("/get-timetables/:user_id", get(list))
        .route("/delete-timetable/:id", delete(remove))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::with_base_url(&format!("http://{}/", addr)).unwrap();
    (config, state)
}

fn setup(title: &str) -> ResourceSetup {
    ResourceSetup {
        title: title.to_string(),
        classes: vec!["BE".into()],
        subjects: vec!["DB".into(), "DB Lab".into(), "".into()],
        classrooms: vec!["C1".into(), "C2".into(), "C3".into()],
        labs: vec!["Lab 1".into()],
        ..Default::default()
    }
}

fn faculty() -> Vec<FacultyInput> {
    vec![FacultyInput::new(
        "Rao",
        vec![
            RawPeriodEntry::new("BE", "DB", 3),
            RawPeriodEntry::new("BE", "DB Lab", 2),
        ],
    )]
}

async fn session() -> (GenerationSession, Arc<MockState>) {
    let (config, state) = spawn_service().await;
    let session = GenerationSession::new(GenerationClient::new(config).unwrap());
    (session, state)
}

#[tokio::test]
async fn test_generate_success() {
    let (session, _) = session().await;
    let result = session.generate(setup("ok"), faculty()).await.unwrap();

    assert_eq!(result.title, "ok");
    assert_eq!(result.subjects, vec!["DB", "DB Lab"]);
    assert_eq!(result.faculty[0].load_assignments.len(), 2);
    assert_eq!(result.faculty[0].load_assignments[1].lab_load, 2);

    let be = result.class_timetable.get("BE").unwrap();
    assert_eq!(be[0][1], PeriodEntry::Free);
    assert_eq!(be[1][1], PeriodEntry::Free);
    assert_eq!(result.teacher_timetable.get("Rao").unwrap()[0][1], PeriodEntry::Free);

    let view = result.view(ResourceKind::Class);
    let table = view.display_table("BE").unwrap();
    assert_eq!(table.period_labels.len(), 4);
    assert_eq!(table.rows[0].cells[2], "DB Lab(Rao) [Lab 1] [Batch 1]");
    assert_eq!(table.rows[1].cells[3], "Free");

    assert_eq!(session.current().await.unwrap(), result);
    assert!(!session.is_generating());
}

#[tokio::test]
async fn test_service_error_keeps_inputs() {
    let (session, _) = session().await;
    let err = session.generate(setup("error"), faculty()).await.unwrap_err();

    match &err {
        TimetableError::Generation { message, error_type } => {
            assert!(message.starts_with("Class BE requires 50 periods"));
            assert_eq!(error_type.as_deref(), Some("INPUT_VALIDATION_FAILED"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.remediation_hints().len(), 4);
    assert!(session.current().await.is_none());
    assert_eq!(session.last_inputs().await.unwrap().faculty, faculty());
}

#[tokio::test]
async fn test_infeasible_and_gateway_failures() {
    let (session, _) = session().await;

    let err = session.generate(setup("infeasible"), faculty()).await.unwrap_err();
    assert!(matches!(err, TimetableError::Infeasible { .. }));

    let err = session.generate(setup("bad-gateway"), faculty()).await.unwrap_err();
    assert!(matches!(err, TimetableError::Network { .. }));
    assert!(!err.is_service_reported());
    assert!(!session.is_generating());
}

#[tokio::test]
async fn test_validation_never_reaches_service() {
    // nothing listens here; a network attempt would fail with Network
    let offline = ClientConfig::with_base_url("http://127.0.0.1:9/").unwrap();
    let session = GenerationSession::new(GenerationClient::new(offline).unwrap());

    let odd = vec![FacultyInput::new("Rao", vec![RawPeriodEntry::new("BE", "DB Lab", 3)])];
    let err = session.generate(setup("ok"), odd).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_duplicate_submission_rejected() {
    let (session, _) = session().await;
    let session = Arc::new(session);

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.generate(setup("slow"), faculty()).await })
    };

    while !session.is_generating() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let err = session.generate(setup("ok"), faculty()).await.unwrap_err();
    assert_eq!(err, TimetableError::InProgress);
    assert!(!err.preserves_input());

    let result = first.await.unwrap().unwrap();
    assert_eq!(result.title, "slow");
    // the rejected submission did not overwrite the running one's inputs
    assert_eq!(session.last_inputs().await.unwrap().setup.title, "slow");
}

#[tokio::test]
async fn test_regenerate_replaces_result() {
    let (session, _) = session().await;
    let first = session.generate(setup("ok"), faculty()).await.unwrap();
    let second = session.regenerate().await.unwrap();

    assert_eq!(*first, *second);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&session.current().await.unwrap(), &second));
}

#[tokio::test]
async fn test_store_round_trip() {
    let (config, state) = spawn_service().await;
    let config = config.with_user_id("dept-cs");
    let session = GenerationSession::new(GenerationClient::new(config.clone()).unwrap());
    let store = StoreClient::new(config).unwrap();

    let result = session.generate(setup("ok"), faculty()).await.unwrap();
    let saved = store.save(&result, None).await.unwrap();
    assert_eq!(saved.id, "id0");
    assert_eq!(saved.user_id.as_deref(), Some("dept-cs"));
    assert_eq!(saved.result.faculty, result.faculty);
    assert!(saved.created_at().is_some());

    let listed = store.list(false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].result.class_timetable, result.class_timetable);
    store.list(false).await.unwrap();
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 1);

    let mut renamed = (*result).clone();
    renamed.title = "renamed".into();
    let updated = store.save(&renamed, Some(&saved.id)).await.unwrap();
    assert_eq!(updated.result.title, "renamed");

    // saving invalidated the cached listing
    let listed = store.list(false).await.unwrap();
    assert_eq!(listed[0].result.title, "renamed");
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(*state.saved_by.lock().unwrap(), vec!["dept-cs", "dept-cs"]);

    assert!(matches!(
        store.save(&renamed, Some("missing")).await,
        Err(StoreError::NotFound { .. })
    ));

    assert!(store.delete(&saved.id).await.unwrap());
    assert!(!store.delete(&saved.id).await.unwrap());
    assert!(store.list(false).await.unwrap().is_empty());
}
