use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user;
use super::validation::{validate_id, validate_search_query};
use super::{ApiError, ApiResponse, MessageResponse};
use crate::db::ProfileInput;
use crate::models::{Volunteer, VolunteerStatus};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub skill: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileRequest {
    pub skills: String,
    pub availability: String,
    pub experience: Option<String>,
    pub interests: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

impl From<ProfileRequest> for ProfileInput {
    fn from(payload: ProfileRequest) -> Self {
        Self {
            skills: payload.skills,
            availability: payload.availability,
            experience: payload.experience,
            interests: payload.interests,
            emergency_contact: payload.emergency_contact,
            emergency_phone: payload.emergency_phone,
        }
    }
}

/// GET /volunteers  (admin)
/// List volunteers, optionally narrowed by status or skill.
pub async fn list_volunteers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Volunteer>>>, ApiError> {
    if let Some(skill) = params.skill.as_deref() {
        let skill = validate_search_query(skill)?;
        let volunteers = state.volunteer_service.find_by_skill(skill).await?;
        return Ok(Json(ApiResponse::success(volunteers)));
    }

    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<VolunteerStatus>()
                .map_err(ApiError::validation)?,
        ),
        None => None,
    };

    let volunteers = state.volunteer_service.list(status).await?;
    Ok(Json(ApiResponse::success(volunteers)))
}

/// GET /volunteers/me
/// The current user's own volunteer profile.
pub async fn my_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Volunteer>>, ApiError> {
    let user = session_user(&session).await?;
    let volunteer = state.volunteer_service.get_by_user(user.id).await?;
    Ok(Json(ApiResponse::success(volunteer)))
}

/// PUT /volunteers/me
/// Update the current user's own volunteer profile.
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<Volunteer>>, ApiError> {
    let user = session_user(&session).await?;

    let volunteer = state
        .volunteer_service
        .update_profile(user.id, payload.into())
        .await?;

    state.notifier.success("Profile updated");

    Ok(Json(ApiResponse::success(volunteer)))
}

/// GET /volunteers/{id}  (admin)
pub async fn get_volunteer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Volunteer>>, ApiError> {
    let id = validate_id(id, "volunteer")?;
    let volunteer = state.volunteer_service.get(id).await?;
    Ok(Json(ApiResponse::success(volunteer)))
}

/// PUT /volunteers/{id}/status  (admin)
/// Flip a volunteer between active and inactive.
pub async fn set_volunteer_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<Volunteer>>, ApiError> {
    let id = validate_id(id, "volunteer")?;
    let status = payload
        .status
        .parse::<VolunteerStatus>()
        .map_err(ApiError::validation)?;

    let volunteer = state.volunteer_service.set_status(id, status).await?;

    state.notifier.info(format!(
        "Volunteer {} is now {}",
        volunteer.full_name, volunteer.status
    ));

    Ok(Json(ApiResponse::success(volunteer)))
}

/// DELETE /volunteers/{id}  (admin)
/// Delete a volunteer along with their user account.
pub async fn delete_volunteer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "volunteer")?;

    state.volunteer_service.delete(id).await?;

    state.notifier.info("Volunteer deleted");

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Volunteer and user account deleted",
    ))))
}
