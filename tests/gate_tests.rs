//! Access-gate behavior: redirects, flash messages, and their ordering.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use volarr::config::Config;
use volarr::state::AppState;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config.general.max_db_connections = 1;

    let state = AppState::new(config)
        .await
        .expect("Failed to create app state");
    volarr::api::router(state).await
}

fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("No session cookie set")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn fetch_flash(app: &Router, cookie: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/flash")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": username, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login failed");
    session_cookie(&response)
}

async fn register_volunteer(app: &Router, username: &str) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "username": username,
                        "email": format!("{username}@example.com"),
                        "password": "Volunteer1",
                        "confirm_password": "Volunteer1",
                        "full_name": "Gate Tester"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "registration failed");
}

#[tokio::test]
async fn test_anonymous_is_redirected_to_login_with_flash() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );

    // The flash lives in the session the redirect created
    let cookie = session_cookie(&response);
    let flash = fetch_flash(&app, &cookie).await;
    assert_eq!(flash["data"]["kind"], "error");
    assert_eq!(flash["data"]["message"], "Please login to access this page");

    // Flash messages are single-read: the second fetch comes back empty
    let flash = fetch_flash(&app, &cookie).await;
    assert!(flash["data"].is_null());
}

#[tokio::test]
async fn test_admin_gate_checks_login_before_role() {
    let app = spawn_app().await;

    // Anonymous hits the admin route and lands on login, not the dashboard
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/volunteers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );

    let cookie = session_cookie(&response);
    let flash = fetch_flash(&app, &cookie).await;
    assert_eq!(flash["data"]["kind"], "error");
    assert_eq!(flash["data"]["message"], "Please login to access this page");
}

#[tokio::test]
async fn test_volunteer_is_denied_admin_routes() {
    let app = spawn_app().await;

    register_volunteer(&app, "gatevol").await;
    let cookie = login(&app, "gatevol", "Volunteer1").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/volunteers")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );

    let flash = fetch_flash(&app, &cookie).await;
    assert_eq!(flash["data"]["kind"], "error");
    assert_eq!(
        flash["data"]["message"],
        "Access denied. Admin privileges required."
    );
}

#[tokio::test]
async fn test_logout_invalidates_the_session() {
    let app = spawn_app().await;
    let cookie = login(&app, "admin", "ChangeMe123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_sets_welcome_flash() {
    let app = spawn_app().await;
    let cookie = login(&app, "admin", "ChangeMe123").await;

    let flash = fetch_flash(&app, &cookie).await;
    assert_eq!(flash["data"]["kind"], "success");
    assert_eq!(flash["data"]["message"], "Welcome back, Administrator!");
}
