//! End-to-end behaviour of a session: load, point mutations, reminders,
//! reconciliation.

mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::{dead_backend, settle, start_backend, RecordingSurface};
use remindust::client::BackendClient;
use remindust::config::AlertSettings;
use remindust::error::SessionError;
use remindust::models::{DueTime, Task, TaskId};
use remindust::session::Session;
use remindust::sync::SyncStatus;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

fn session_for(url: &str, mirror: bool) -> Session<RecordingSurface> {
    let client = BackendClient::new(url).unwrap();
    Session::new(client, RecordingSurface::default(), &AlertSettings::default(), mirror)
}

#[tokio::test]
async fn test_call_alice_scenario() {
    let (url, _dir) = start_backend().await;
    let mut session = session_for(&url, false);
    session.start();
    settle(&mut session).await;
    assert_eq!(session.sync_status(), SyncStatus::Synced);

    session.create("Call Alice", DueTime::new(14, 30).ok()).unwrap();
    settle(&mut session).await;
    let id = session.tasks()[0].id.clone();

    // created at 14:00, nothing until 14:30
    for minute in 0..30 {
        assert_eq!(session.tick(at(14, minute, 0)), 0);
    }
    assert_eq!(session.tick(at(14, 30, 0)), 1);
    assert_eq!(session.tick(at(14, 30, 1)), 0);
    assert_eq!(session.tick(at(14, 30, 59)), 0);

    // marked complete at 14:31
    assert_eq!(session.toggle(&id), Ok(true));
    settle(&mut session).await;
    for minute in 31..60 {
        assert_eq!(session.tick(at(14, minute, 0)), 0);
    }

    let surface = session.dispatcher().surface();
    assert_eq!(surface.toasts, vec!["Call Alice".to_string()]);
    assert_eq!(surface.cues, 1);
    assert_eq!(session.sync_status(), SyncStatus::Synced);

    // the backend saw the completion too
    let remote = BackendClient::new(&url).unwrap().fetch_all().await.unwrap();
    assert!(remote[0].complete);
}

#[tokio::test]
async fn test_session_loads_existing_tasks_in_order() {
    let (url, _dir) = start_backend().await;
    let client = BackendClient::new(&url).unwrap();
    for name in ["first", "second", "third"] {
        client
            .create(&remindust::models::NewTask::new(name, None))
            .await
            .unwrap();
    }

    let mut session = session_for(&url, false);
    session.start();
    settle(&mut session).await;

    let names: Vec<String> = session.tasks().iter().map(|t| t.description.clone()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_remove_is_optimistic_and_reaches_backend() {
    let (url, _dir) = start_backend().await;
    let mut session = session_for(&url, false);
    session.start();
    settle(&mut session).await;
    session.create("Soon gone", DueTime::new(9, 0).ok()).unwrap();
    settle(&mut session).await;
    let id = session.tasks()[0].id.clone();

    assert_eq!(session.tick(at(9, 0, 0)), 1);
    assert!(session.was_notified(&id));

    let removed = session.remove(&id).unwrap();
    assert_eq!(removed.description, "Soon gone");
    assert!(session.tasks().is_empty());
    assert!(!session.was_notified(&id));
    settle(&mut session).await;

    let remote = BackendClient::new(&url).unwrap().fetch_all().await.unwrap();
    assert!(remote.is_empty());
}

#[tokio::test]
async fn test_empty_description_is_rejected() {
    let (url, _dir) = start_backend().await;
    let mut session = session_for(&url, false);
    assert_eq!(session.create("   ", None), Err(SessionError::EmptyDescription));
    assert_eq!(session.in_flight(), 0);
}

#[tokio::test]
async fn test_unknown_ids_are_rejected() {
    let (url, _dir) = start_backend().await;
    let mut session = session_for(&url, false);
    let id = TaskId::Number(99);
    assert_eq!(session.toggle(&id), Err(SessionError::UnknownTask(id.clone())));
    assert!(session.remove(&id).is_err());
}

#[tokio::test]
async fn test_load_failure_leaves_session_usable() {
    let url = dead_backend().await;
    let mut session = session_for(&url, false);
    session.start();
    settle(&mut session).await;

    assert_eq!(session.sync_status(), SyncStatus::Unsynced);
    assert!(session.tasks().is_empty());

    // creation needs the backend's id, so nothing joins the list
    session.create("Offline", None).unwrap();
    settle(&mut session).await;
    assert!(session.tasks().is_empty());
    assert_eq!(session.tick(at(23, 0, 0)), 0);
}

fn puts(requests: &[wiremock::Request]) -> Vec<Value> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_failed_point_mutation_triggers_reconciliation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "task": "Pay rent", "complete": false, "time": ""}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/todos/1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/todos/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), false);
    session.start();
    settle(&mut session).await;
    let id = TaskId::Number(1);

    session.toggle(&id).unwrap();
    settle(&mut session).await;
    assert_eq!(session.sync_status(), SyncStatus::Diverged);

    session.toggle(&id).unwrap();
    settle(&mut session).await;
    assert_eq!(session.sync_status(), SyncStatus::Synced);

    let pushed = puts(&server.received_requests().await.unwrap());
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0][0]["complete"], json!(false));
}

#[tokio::test]
async fn test_no_snapshot_push_when_point_mutations_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "task": "Pay rent", "complete": false, "time": ""}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), false);
    session.start();
    settle(&mut session).await;
    session.toggle(&TaskId::Number(1)).unwrap();
    session.toggle(&TaskId::Number(1)).unwrap();
    settle(&mut session).await;
    assert_eq!(session.sync_status(), SyncStatus::Synced);
}

#[tokio::test]
async fn test_mirror_mode_pushes_every_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "task": "Pay rent", "complete": false, "time": ""}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), true);
    session.start();
    settle(&mut session).await;

    session.toggle(&TaskId::Number(1)).unwrap();
    settle(&mut session).await;
    let after_first = puts(&server.received_requests().await.unwrap());
    assert_eq!(after_first.last().unwrap()[0]["complete"], json!(true));

    session.toggle(&TaskId::Number(1)).unwrap();
    settle(&mut session).await;
    let after_second = puts(&server.received_requests().await.unwrap());
    assert_eq!(after_second.len(), 3);
    assert_eq!(after_second.last().unwrap()[0]["complete"], json!(false));

    let tasks: Vec<Task> = session.tasks().to_vec();
    assert!(!tasks[0].complete);
}

async fn slow_empty_backend(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/todos"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 1, "task": "Call Alice", "complete": false, "time": ""})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_task_created_during_initial_load_survives_it() {
    let server = MockServer::start().await;
    slow_empty_backend(&server).await;

    let mut session = session_for(&server.uri(), false);
    session.start();
    session.create("Call Alice", None).unwrap();
    settle(&mut session).await;

    let names: Vec<String> = session.tasks().iter().map(|t| t.description.clone()).collect();
    assert_eq!(names, vec!["Call Alice"]);
    assert_eq!(session.sync_status(), SyncStatus::Synced);
}

#[tokio::test]
async fn test_mirror_push_after_slow_load_keeps_new_task() {
    let server = MockServer::start().await;
    slow_empty_backend(&server).await;
    Mock::given(method("PUT"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), true);
    session.start();
    session.create("Call Alice", None).unwrap();
    settle(&mut session).await;

    assert_eq!(session.tasks().len(), 1);
    let pushed = puts(&server.received_requests().await.unwrap());
    assert!(!pushed.is_empty());
    for body in pushed {
        assert_eq!(body[0]["task"], json!("Call Alice"));
    }
}
