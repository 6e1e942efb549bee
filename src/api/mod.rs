use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::state::AppState;

pub mod auth;
pub mod dashboard;
mod error;
pub mod events;
pub mod notifications;
pub mod system;
mod types;
mod validation;
pub mod volunteers;

pub use error::ApiError;
pub use notifications::{NotificationEvent, NotificationKind};
pub use types::*;

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_timeout_minutes) = {
        let config = state.config.read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_timeout_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            i64::try_from(session_timeout_minutes).unwrap_or(60),
        )));

    let admin_routes = create_admin_router(state.clone());
    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(admin_routes)
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/flash", get(auth::get_flash))
        .route("/validate", post(validation::validate_form_handler))
        .route("/validate/password", post(validation::password_strength_handler))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Routes any signed-in user may call, behind the login gate.
fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/events", get(events::list_events))
        .route("/events/upcoming", get(events::upcoming_events))
        .route("/events/{id}", get(events::get_event))
        .route("/events/{id}/register", post(events::register_for_event))
        .route(
            "/events/{id}/registration",
            delete(events::cancel_registration),
        )
        .route("/registrations", get(events::my_registrations))
        .route("/volunteers/me", get(volunteers::my_profile))
        .route("/volunteers/me", put(volunteers::update_my_profile))
        .route("/system/status", get(system::get_status))
        .merge(notifications::router())
        .route_layer(middleware::from_fn_with_state(state, auth::require_login))
}

/// Admin-only routes. The admin gate checks login first, so anonymous
/// callers land on the login page rather than the dashboard.
fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(events::create_event))
        .route("/events/{id}", put(events::update_event))
        .route("/events/{id}", delete(events::delete_event))
        .route(
            "/events/{id}/registrations",
            get(events::list_event_registrations),
        )
        .route("/volunteers", get(volunteers::list_volunteers))
        .route("/volunteers/{id}", get(volunteers::get_volunteer))
        .route(
            "/volunteers/{id}/status",
            put(volunteers::set_volunteer_status),
        )
        .route("/volunteers/{id}", delete(volunteers::delete_volunteer))
        .route(
            "/registrations/{id}",
            delete(events::admin_cancel_registration),
        )
        .route("/registrations/{id}/attended", put(events::mark_attended))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}
