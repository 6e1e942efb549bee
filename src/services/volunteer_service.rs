//! Domain service for volunteer profiles.

use thiserror::Error;

use crate::db::ProfileInput;
use crate::models::{Volunteer, VolunteerStatus};

#[derive(Debug, Error)]
pub enum VolunteerError {
    #[error("Volunteer {0} not found")]
    NotFound(i32),

    #[error("No volunteer profile for this account")]
    NoProfile,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for VolunteerError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for VolunteerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for volunteers.
#[async_trait::async_trait]
pub trait VolunteerService: Send + Sync {
    async fn list(&self, status: Option<VolunteerStatus>) -> Result<Vec<Volunteer>, VolunteerError>;

    async fn find_by_skill(&self, skill: &str) -> Result<Vec<Volunteer>, VolunteerError>;

    async fn get(&self, id: i32) -> Result<Volunteer, VolunteerError>;

    /// The profile belonging to a user account.
    async fn get_by_user(&self, user_id: i32) -> Result<Volunteer, VolunteerError>;

    /// Updates a user's own profile. Skills, availability, and emergency
    /// contact details are required; the emergency phone must be a valid
    /// 10-digit number.
    async fn update_profile(
        &self,
        user_id: i32,
        input: ProfileInput,
    ) -> Result<Volunteer, VolunteerError>;

    /// Admin action: flips a volunteer between active and inactive.
    async fn set_status(
        &self,
        id: i32,
        status: VolunteerStatus,
    ) -> Result<Volunteer, VolunteerError>;

    /// Admin action: deletes a volunteer together with their user account.
    async fn delete(&self, id: i32) -> Result<(), VolunteerError>;
}
