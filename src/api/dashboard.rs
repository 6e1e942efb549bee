use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user;
use super::{ApiError, ApiResponse, DashboardResponse};
use crate::models::VolunteerStatus;
use crate::state::AppState;

/// GET /dashboard
/// Role-shaped dashboard: admins get counts plus the next events, volunteers
/// get upcoming events and their own registrations.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<DashboardResponse>>, ApiError> {
    let user = session_user(&session).await?;
    let today = chrono::Local::now().date_naive();
    let upcoming_limit = state.config.read().await.events.upcoming_limit;

    let upcoming_events = state.event_service.upcoming(today, upcoming_limit).await?;

    let dashboard = if user.is_admin() {
        let total_events = state.store.count_events().await?;
        let active_volunteers = state
            .store
            .count_volunteers_by_status(VolunteerStatus::Active)
            .await?;
        let inactive_volunteers = state
            .store
            .count_volunteers_by_status(VolunteerStatus::Inactive)
            .await?;

        DashboardResponse::Admin {
            total_events,
            active_volunteers,
            inactive_volunteers,
            upcoming_events,
        }
    } else {
        let my_registrations = state.registration_service.list_for_user(user.id).await?;

        DashboardResponse::Volunteer {
            upcoming_events,
            my_registrations,
        }
    };

    Ok(Json(ApiResponse::success(dashboard)))
}
