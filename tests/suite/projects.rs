//! Project collection flows against a mock backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use slate_engine::{
    CREATE_FAILED, CREATE_SUCCEEDED, DELETE_FAILED, DELETE_SUCCEEDED, Dispatch, LOAD_FAILED,
    ToastLevel,
};

use crate::common::{
    mount_create, mount_delete, mount_list, mount_status, project_json, start_backend,
    started_app,
};

fn ids(app: &slate_engine::App) -> Vec<String> {
    app.visible_projects()
        .iter()
        .map(|p| p.id.to_string())
        .collect()
}

#[tokio::test]
async fn load_failure_keeps_collection_and_raises_one_error() {
    let server = start_backend().await;
    mount_status(&server, "GET", 500).await;

    let app = started_app(&server).await;
    assert!(app.visible_projects().is_empty());
    assert!(!app.is_loading());
    assert_eq!(app.notifications().len(), 1);
    let toast = app.notifications().latest().unwrap();
    assert_eq!(toast.level(), ToastLevel::Error);
    assert_eq!(toast.message(), LOAD_FAILED);
}

#[tokio::test]
async fn create_prepends_and_confirms() {
    let server = start_backend().await;
    mount_list(&server, vec![project_json("p1", "Alpha", "")]).await;
    let mut app = started_app(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .and(body_json(json!({ "name": "Beta", "description": "Second" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": project_json("p2", "Beta", "Second")
        })))
        .expect(1)
        .mount(&server)
        .await;

    app.open_create();
    "Beta".chars().for_each(|c| app.create_insert(c));
    app.create_next_field();
    "Second".chars().for_each(|c| app.create_insert(c));
    assert_eq!(app.submit_create(), Some(Dispatch::Started));
    app.settle().await;

    assert_eq!(ids(&app), ["p2", "p1"]);
    assert!(app.create_modal().is_none());
    let toast = app.notifications().latest().unwrap();
    assert_eq!(toast.level(), ToastLevel::Success);
    assert_eq!(toast.message(), CREATE_SUCCEEDED);
}

#[tokio::test]
async fn create_failure_leaves_collection_untouched() {
    let server = start_backend().await;
    mount_list(&server, vec![project_json("p1", "Alpha", "")]).await;
    let mut app = started_app(&server).await;
    mount_status(&server, "POST", 422).await;

    app.open_create();
    app.create_insert('X');
    app.submit_create();
    app.settle().await;

    assert_eq!(ids(&app), ["p1"]);
    assert_eq!(app.notifications().latest().unwrap().message(), CREATE_FAILED);
}

#[tokio::test]
async fn repeated_create_is_sent_once() {
    let server = start_backend().await;
    mount_list(&server, vec![]).await;
    let mut app = started_app(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": project_json("p1", "Alpha", "") }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    app.open_create();
    app.create_insert('A');
    assert_eq!(app.submit_create(), Some(Dispatch::Started));
    assert_eq!(app.submit_create(), Some(Dispatch::InFlight));
    app.settle().await;

    assert_eq!(ids(&app), ["p1"]);
}

#[tokio::test]
async fn delete_removes_only_after_confirmation() {
    let server = start_backend().await;
    mount_list(
        &server,
        vec![project_json("p1", "Alpha", ""), project_json("p2", "Beta", "")],
    )
    .await;
    let mut app = started_app(&server).await;
    mount_delete(&server, project_json("p1", "Alpha", "")).await;

    app.request_delete();
    assert_eq!(app.confirm_delete(), Some(Dispatch::Started));
    // Still listed until the backend answers.
    assert_eq!(ids(&app), ["p1", "p2"]);

    app.settle().await;
    assert_eq!(ids(&app), ["p2"]);
    assert_eq!(
        app.notifications().latest().unwrap().message(),
        DELETE_SUCCEEDED
    );
}

#[tokio::test]
async fn delete_failure_keeps_project() {
    let server = start_backend().await;
    mount_list(&server, vec![project_json("p1", "Alpha", "")]).await;
    let mut app = started_app(&server).await;
    mount_status(&server, "DELETE", 404).await;

    app.request_delete();
    app.confirm_delete();
    app.settle().await;

    assert_eq!(ids(&app), ["p1"]);
    assert_eq!(app.notifications().latest().unwrap().message(), DELETE_FAILED);
}

#[tokio::test]
async fn shutdown_discards_outstanding_requests() {
    let server = start_backend().await;
    mount_list(&server, vec![project_json("p1", "Alpha", "")]).await;
    let mut app = started_app(&server).await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": project_json("p2", "Beta", "") }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    app.open_create();
    app.create_insert('B');
    app.submit_create();
    app.shutdown();
    assert!(!app.projects().has_pending());

    tokio::time::sleep(Duration::from_millis(100)).await;
    app.settle().await;
    assert_eq!(ids(&app), ["p1"]);
    assert!(app.notifications().is_empty());
}

#[tokio::test]
async fn filter_is_a_view_over_the_collection() {
    let server = start_backend().await;
    mount_list(
        &server,
        vec![
            project_json("p1", "Website", "Marketing site"),
            project_json("p2", "Backend", "API for the WEBSITE"),
            project_json("p3", "Mobile", ""),
        ],
    )
    .await;
    let mut app = started_app(&server).await;

    app.set_search("website");
    assert_eq!(ids(&app), ["p1", "p2"]);
    app.set_search("");
    assert_eq!(ids(&app), ["p1", "p2", "p3"]);
    assert_eq!(app.projects().projects().len(), 3);
}

#[tokio::test]
async fn created_project_survives_in_collection_without_reload() {
    let server = start_backend().await;
    mount_list(&server, vec![]).await;
    let mut app = started_app(&server).await;
    mount_create(&server, project_json("p9", "Fresh", "")).await;

    app.open_create();
    app.create_insert('F');
    app.submit_create();
    app.settle().await;

    let requests = server.received_requests().await.unwrap();
    let gets = requests
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 1);
    assert_eq!(ids(&app), ["p9"]);
}
