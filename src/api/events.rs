use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, MessageResponse};
use crate::db::EventInput;
use crate::db::repositories::event::{parse_date, parse_time};
use crate::models::{Event, EventStatus, Registration};
use crate::services::EventFilter;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// "YYYY-MM-DD"
    pub event_date: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub volunteers_needed: i32,
    pub category: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub notes: Option<String>,
}

fn parse_event_request(payload: EventRequest) -> Result<EventInput, ApiError> {
    let event_date =
        parse_date(&payload.event_date).map_err(|e| ApiError::validation(e.to_string()))?;
    let start_time =
        parse_time(&payload.start_time).map_err(|e| ApiError::validation(e.to_string()))?;
    let end_time =
        parse_time(&payload.end_time).map_err(|e| ApiError::validation(e.to_string()))?;

    let status = match payload.status.as_deref() {
        None | Some("") => EventStatus::Active,
        Some(raw) => raw.parse::<EventStatus>().map_err(ApiError::validation)?,
    };

    Ok(EventInput {
        title: payload.title,
        description: payload.description,
        location: payload.location,
        event_date,
        start_time,
        end_time,
        volunteers_needed: payload.volunteers_needed,
        category: payload.category,
        status,
    })
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// GET /events
/// List events. Category and status filters are mutually exclusive; `q`
/// narrows by substring over title, description, and location.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let category = params.category.filter(|c| !c.is_empty());
    let status = params.status.filter(|s| !s.is_empty());

    let filter = match (category, status) {
        (Some(_), Some(_)) => {
            return Err(ApiError::validation(
                "Category and status filters are mutually exclusive",
            ));
        }
        (Some(category), None) => Some(EventFilter::Category(category)),
        (None, Some(raw)) => Some(EventFilter::Status(
            raw.parse::<EventStatus>().map_err(ApiError::validation)?,
        )),
        (None, None) => None,
    };

    let events = state
        .event_service
        .list(filter, params.q.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(events)))
}

/// GET /events/upcoming
/// Active events from today on, soonest first.
pub async fn upcoming_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let events = state.event_service.list_active_upcoming(today()).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let id = validate_id(id, "event")?;
    let event = state.event_service.get(id).await?;
    Ok(Json(ApiResponse::success(event)))
}

/// POST /events  (admin)
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<EventRequest>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let user = session_user(&session).await?;
    let input = parse_event_request(payload)?;

    let event = state.event_service.create(input, user.id, today()).await?;

    state.notifier.success(format!(
        "Event \"{}\" scheduled for {}",
        event.title,
        crate::validation::format_date(event.event_date)
    ));

    Ok(Json(ApiResponse::success(event)))
}

/// PUT /events/{id}  (admin)
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<EventRequest>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let id = validate_id(id, "event")?;
    let input = parse_event_request(payload)?;

    let event = state.event_service.update(id, input, today()).await?;

    state
        .notifier
        .info(format!("Event \"{}\" updated", event.title));

    Ok(Json(ApiResponse::success(event)))
}

/// DELETE /events/{id}  (admin)
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "event")?;

    state.event_service.delete(id).await?;

    state.notifier.info("Event deleted");

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Event deleted",
    ))))
}

/// POST /events/{id}/register
/// Sign the current volunteer up for an event.
pub async fn register_for_event(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<Registration>>, ApiError> {
    let id = validate_id(id, "event")?;
    let user = session_user(&session).await?;
    let notes = payload.notes;

    let registration = state
        .registration_service
        .register(id, user.id, notes, today())
        .await?;

    state.notifier.success("Registered for event");

    Ok(Json(ApiResponse::success(registration)))
}

/// DELETE /events/{id}/registration
/// Cancel the current volunteer's registration.
pub async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "event")?;
    let user = session_user(&session).await?;

    state.registration_service.cancel_own(id, user.id).await?;

    state.notifier.info("Registration cancelled");

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Registration cancelled",
    ))))
}

/// GET /events/{id}/registrations  (admin)
/// The sign-up roster for one event.
pub async fn list_event_registrations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Registration>>>, ApiError> {
    let id = validate_id(id, "event")?;
    let registrations = state.registration_service.list_for_event(id).await?;
    Ok(Json(ApiResponse::success(registrations)))
}

/// GET /registrations
/// The current volunteer's own registrations, newest first.
pub async fn my_registrations(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<Registration>>>, ApiError> {
    let user = session_user(&session).await?;
    let registrations = state.registration_service.list_for_user(user.id).await?;
    Ok(Json(ApiResponse::success(registrations)))
}

/// DELETE /registrations/{id}  (admin)
pub async fn admin_cancel_registration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "registration")?;

    state.registration_service.cancel(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Registration cancelled",
    ))))
}

/// PUT /registrations/{id}/attended  (admin)
pub async fn mark_attended(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "registration")?;

    state.registration_service.mark_attended(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Attendance recorded",
    ))))
}
