//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slate_engine::{ApiClient, App, AppSettings, Credential, ProjectsApi, StaticSession, SubjectId};

pub const TOKEN: &str = "test-token";
pub const USER: &str = "user_1";

/// Start a mock server that simulates the projects backend
pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

pub fn project_json(id: &str, name: &str, description: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": description,
        "created_at": "2025-03-01T12:00:00Z",
        "clerk_id": USER
    })
}

/// Mount `GET /api/projects` returning `projects` for an authorized caller.
pub async fn mount_list(server: &MockServer, projects: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": projects })))
        .mount(server)
        .await;
}

/// Mount `POST /api/projects` echoing back `project`.
pub async fn mount_create(server: &MockServer, project: Value) {
    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": project })))
        .mount(server)
        .await;
}

/// Mount `DELETE /api/projects/{id}` returning the deleted entity.
pub async fn mount_delete(server: &MockServer, project: Value) {
    let id = project["id"].as_str().unwrap_or_default().to_string();
    Mock::given(method("DELETE"))
        .and(path(format!("/api/projects/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": project })))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, http_method: &str, status: u16) {
    Mock::given(method(http_method))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn signed_in_session() -> StaticSession {
    StaticSession::new(SubjectId::new(USER), Credential::new(TOKEN))
}

pub fn app(server: &MockServer, session: StaticSession) -> App {
    let api = ProjectsApi::new(ApiClient::new(&server.uri()).unwrap());
    App::new(api, Arc::new(session), AppSettings::default())
}

/// A signed-in app that has started and finished its initial load.
pub async fn started_app(server: &MockServer) -> App {
    let mut app = app(server, signed_in_session());
    app.start();
    app.settle().await;
    app
}
