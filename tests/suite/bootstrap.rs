//! Root gate and session-driven routing.

use slate_engine::{Credential, Route, StaticSession, SubjectId, bootstrap};

use crate::common::{USER, app, mount_list, project_json, signed_in_session, start_backend};

#[test]
fn root_resolves_from_session_subject() {
    assert_eq!(bootstrap(&signed_in_session()), Route::Projects);
    assert_eq!(bootstrap(&StaticSession::anonymous()), Route::SignIn);

    // A credential alone does not make a signed-in session.
    let token_only = StaticSession::new(None, Credential::new("tok"));
    assert_eq!(bootstrap(&token_only), Route::SignIn);

    // Blank subjects are treated as absent.
    assert!(SubjectId::new("   ").is_none());
}

#[test]
fn route_paths() {
    assert_eq!(Route::Root.path(), "/");
    assert_eq!(Route::SignIn.path(), "/sign-in");
    assert_eq!(Route::SignUp.path(), "/sign-up");
    assert_eq!(Route::Projects.path(), "/projects");
    assert_eq!(
        Route::ProjectDetail("p1".into()).to_string(),
        "/projects/p1"
    );
}

#[tokio::test]
async fn signed_in_start_lands_on_projects_and_loads_with_bearer() {
    let server = start_backend().await;
    mount_list(&server, vec![project_json("p1", "Alpha", "")]).await;

    let mut app = app(&server, signed_in_session());
    app.start();
    assert_eq!(app.route(), &Route::Projects);
    assert!(app.is_loading());

    app.settle().await;
    assert_eq!(app.visible_projects().len(), 1);
    assert_eq!(app.visible_projects()[0].owner_id, USER);
    // A successful load is silent.
    assert!(app.notifications().is_empty());
}

#[tokio::test]
async fn signed_out_start_lands_on_sign_in_and_sends_nothing() {
    let server = start_backend().await;
    let mut app = app(&server, StaticSession::anonymous());
    app.start();

    assert_eq!(app.route(), &Route::SignIn);
    assert!(app.route().is_auth());
    assert!(!app.projects().has_pending());

    app.navigate(Route::ProjectDetail("p1".into()));
    assert_eq!(app.route(), &Route::SignIn);
    assert!(server.received_requests().await.unwrap().is_empty());
}
