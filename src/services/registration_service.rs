//! Domain service for event sign-ups.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Registration;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Event {0} not found")]
    EventNotFound(i32),

    #[error("No volunteer profile for this account")]
    NoProfile,

    #[error("Registration not found")]
    NotFound,

    #[error("You are already registered for this event")]
    AlreadyRegistered,

    #[error("This event is full")]
    EventFull,

    #[error("This event is not open for registration")]
    EventNotOpen,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RegistrationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RegistrationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for registrations.
#[async_trait::async_trait]
pub trait RegistrationService: Send + Sync {
    /// Registers the user's volunteer profile for an event.
    ///
    /// # Errors
    ///
    /// Rejects duplicates, full events, and events that are cancelled,
    /// completed, or already past.
    async fn register(
        &self,
        event_id: i32,
        user_id: i32,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<Registration, RegistrationError>;

    /// Cancels the user's own confirmed registration for an event.
    async fn cancel_own(&self, event_id: i32, user_id: i32) -> Result<(), RegistrationError>;

    /// Admin action: cancels any registration by id.
    async fn cancel(&self, registration_id: i32) -> Result<(), RegistrationError>;

    /// Admin action: marks a confirmed registration as attended.
    async fn mark_attended(&self, registration_id: i32) -> Result<(), RegistrationError>;

    /// Roster for one event, oldest sign-up first.
    async fn list_for_event(&self, event_id: i32) -> Result<Vec<Registration>, RegistrationError>;

    /// The user's own registrations, newest first.
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Registration>, RegistrationError>;
}
