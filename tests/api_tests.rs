use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use volarr::config::Config;
use volarr::state::AppState;

/// Default admin credentials seeded by migration (must match m20260301_initial.rs)
const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "ChangeMe123";

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

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_session(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
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

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login failed");
    session_cookie(&response)
}

async fn register_volunteer(app: &Router, username: &str) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "Volunteer1",
                "confirm_password": "Volunteer1",
                "full_name": "Test Volunteer",
                "phone": "876-555-1234"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "registration failed");
}

fn future_date(days: u64) -> String {
    (chrono::Local::now().date_naive() + chrono::Days::new(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn event_body(title: &str, needed: i32) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": "Help clean up the beach",
        "location": "Hellshire Beach",
        "event_date": future_date(30),
        "start_time": "09:00",
        "end_time": "12:00",
        "volunteers_needed": needed,
        "category": "environment"
    })
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": ADMIN_USER, "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"]["password_hash"].is_null());
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = spawn_app().await;

    // Password without uppercase fails the policy
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "username": "newvol",
                "email": "newvol@example.com",
                "password": "abc12345",
                "confirm_password": "abc12345",
                "full_name": "New Volunteer"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    register_volunteer(&app, "newvol").await;

    // Same username again conflicts
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "username": "newvol",
                "email": "other@example.com",
                "password": "Volunteer1",
                "confirm_password": "Volunteer1",
                "full_name": "Someone Else"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_event_crud() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(with_session(
            json_request("POST", "/api/events", event_body("Beach Cleanup", 10)),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let event_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["volunteers_registered"], 0);

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri(format!("/api/events/{event_id}"))
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/events/{event_id}"))
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri(format!("/api/events/{event_id}"))
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_rejects_end_before_start() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let mut body = event_body("Backwards Event", 5);
    body["start_time"] = serde_json::json!("10:00");
    body["end_time"] = serde_json::json!("09:00");

    let response = app
        .clone()
        .oneshot(with_session(
            json_request("POST", "/api/events", body),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "End time must be after start time");

    // Nothing was persisted
    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/events")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_event_rejects_past_date() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let mut body = event_body("Yesterday's Event", 5);
    body["event_date"] = serde_json::json!(
        (chrono::Local::now().date_naive() - chrono::Days::new(1))
            .format("%Y-%m-%d")
            .to_string()
    );

    let response = app
        .clone()
        .oneshot(with_session(
            json_request("POST", "/api/events", body),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Event date cannot be in the past");
}

#[tokio::test]
async fn test_event_filters_are_mutually_exclusive() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/events?category=environment&status=active")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/events?category=environment")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_registration_lifecycle() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(with_session(
            json_request("POST", "/api/events", event_body("Tree Planting", 1)),
            &admin_cookie,
        ))
        .await
        .unwrap();
    let event_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    register_volunteer(&app, "vol1").await;
    let vol_cookie = login(&app, "vol1", "Volunteer1").await;

    // Sign up
    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "POST",
                &format!("/api/events/{event_id}/register"),
                serde_json::json!({}),
            ),
            &vol_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "confirmed");

    // The spot was taken
    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri(format!("/api/events/{event_id}"))
                .body(Body::empty())
                .unwrap(),
            &vol_cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["volunteers_registered"], 1);

    // Registering twice conflicts
    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "POST",
                &format!("/api/events/{event_id}/register"),
                serde_json::json!({}),
            ),
            &vol_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A second volunteer finds the event full
    register_volunteer(&app, "vol2").await;
    let vol2_cookie = login(&app, "vol2", "Volunteer1").await;

    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "POST",
                &format!("/api/events/{event_id}/register"),
                serde_json::json!({}),
            ),
            &vol2_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "This event is full");

    // Cancelling releases the spot
    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/events/{event_id}/registration"))
                .body(Body::empty())
                .unwrap(),
            &vol_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri(format!("/api/events/{event_id}"))
                .body(Body::empty())
                .unwrap(),
            &vol_cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["volunteers_registered"], 0);

    // Now the second volunteer can take the spot
    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "POST",
                &format!("/api/events/{event_id}/register"),
                serde_json::json!({}),
            ),
            &vol2_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_volunteer_profile_update() {
    let app = spawn_app().await;

    register_volunteer(&app, "profvol").await;
    let cookie = login(&app, "profvol", "Volunteer1").await;

    // Emergency phone must be a valid 10-digit number
    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "PUT",
                "/api/volunteers/me",
                serde_json::json!({
                    "skills": "First aid",
                    "availability": "Weekends",
                    "emergency_contact": "Jane Doe",
                    "emergency_phone": "123"
                }),
            ),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "PUT",
                "/api/volunteers/me",
                serde_json::json!({
                    "skills": "First aid",
                    "availability": "Weekends",
                    "emergency_contact": "Jane Doe",
                    "emergency_phone": "876-555-9999"
                }),
            ),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["skills"], "First aid");
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn test_admin_volunteer_management() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    register_volunteer(&app, "managed").await;

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/volunteers")
                .body(Body::empty())
                .unwrap(),
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let volunteers = body["data"].as_array().unwrap();
    assert_eq!(volunteers.len(), 1);
    let volunteer_id = volunteers[0]["id"].as_i64().unwrap();

    // Deactivate
    let response = app
        .clone()
        .oneshot(with_session(
            json_request(
                "PUT",
                &format!("/api/volunteers/{volunteer_id}/status"),
                serde_json::json!({ "status": "inactive" }),
            ),
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "inactive");

    // Deleting the volunteer also removes the user account
    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/volunteers/{volunteer_id}"))
                .body(Body::empty())
                .unwrap(),
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": "managed", "password": "Volunteer1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_is_role_shaped() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/dashboard")
                .body(Body::empty())
                .unwrap(),
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"]["total_events"].is_u64());

    register_volunteer(&app, "dashvol").await;
    let vol_cookie = login(&app, "dashvol", "Volunteer1").await;

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/dashboard")
                .body(Body::empty())
                .unwrap(),
            &vol_cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "volunteer");
    assert!(body["data"]["my_registrations"].is_array());
}

#[tokio::test]
async fn test_validate_endpoint_reports_every_field() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/validate",
            serde_json::json!([
                {
                    "name": "email",
                    "value": "not-an-email",
                    "rules": { "required": true, "email": true }
                },
                {
                    "name": "username",
                    "value": "x",
                    "rules": { "required": true, "username": true }
                }
            ]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);

    let fields = body["data"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0][1]["is_valid"], false);
    assert_eq!(fields[1][1]["is_valid"], false);
}

#[tokio::test]
async fn test_password_strength_endpoint() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/validate/password",
            serde_json::json!({ "password": "Abc12345" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["score"], 4);
    assert_eq!(body["data"]["level"], "medium");
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(with_session(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["database_ok"], true);
    assert!(body["data"]["version"].is_string());
}
