use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, MessageResponse};
use crate::models::User;
use crate::services::RegisterInput;
use crate::session::{
    Flash, FlashKind, SessionUser, current_user, set_flash, sign_in, sign_out, take_flash,
};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Gates
// ============================================================================

/// Login gate: anonymous requests get an error flash and a redirect to the
/// login page instead of reaching the handler.
pub async fn require_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if current_user(&session).await.is_some() {
        return next.run(request).await;
    }

    set_flash(
        &session,
        FlashKind::Error,
        "Please login to access this page",
    )
    .await;

    let login_path = state.config.read().await.app.login_path.clone();
    Redirect::to(&login_path).into_response()
}

/// Admin gate. The login check runs first, so an anonymous user is sent to
/// the login page, not the dashboard; a logged-in non-admin is sent to the
/// dashboard with an access-denied flash.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let Some(user) = current_user(&session).await else {
        set_flash(
            &session,
            FlashKind::Error,
            "Please login to access this page",
        )
        .await;

        let login_path = state.config.read().await.app.login_path.clone();
        return Redirect::to(&login_path).into_response();
    };

    if !user.is_admin() {
        set_flash(
            &session,
            FlashKind::Error,
            "Access denied. Admin privileges required.",
        )
        .await;

        let dashboard_path = state.config.read().await.app.dashboard_path.clone();
        return Redirect::to(&dashboard_path).into_response();
    }

    next.run(request).await
}

/// Extracts the session user for handlers behind [`require_login`].
pub async fn session_user(session: &Session) -> Result<SessionUser, ApiError> {
    current_user(session).await.ok_or_else(ApiError::unauthorized)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a volunteer account with an empty profile.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .auth_service
        .register(RegisterInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            confirm_password: payload.confirm_password,
            full_name: payload.full_name,
            phone: payload.phone,
        })
        .await?;

    set_flash(
        &session,
        FlashKind::Success,
        "Registration successful! Please login.",
    )
    .await;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Authenticate with username or email plus password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    let user = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    sign_in(&session, &user)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    set_flash(
        &session,
        FlashKind::Success,
        format!("Welcome back, {}!", user.full_name),
    )
    .await;

    Ok(Json(ApiResponse::success(SessionUser::from(&user))))
}

/// POST /auth/logout
/// Invalidate the current session.
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    sign_out(&session).await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
/// Current account details.
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = session_user(&session).await?;
    let user = state.auth_service.get_user(user.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/password
/// Change password after verifying the current one.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = session_user(&session).await?;

    state
        .auth_service
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// GET /flash
/// Take the pending flash message; reading clears it.
pub async fn get_flash(session: Session) -> Json<ApiResponse<Option<Flash>>> {
    Json(ApiResponse::success(take_flash(&session).await))
}
