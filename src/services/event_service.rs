//! Domain service for event management.

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::EventInput;
use crate::models::{Event, EventStatus};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EventError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EventError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Listing filter. Category and status are mutually exclusive by
/// construction; selecting one clears the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    Category(String),
    Status(EventStatus),
}

/// Domain service trait for events.
#[async_trait::async_trait]
pub trait EventService: Send + Sync {
    /// Lists events, optionally narrowed by one filter and a search term.
    async fn list(
        &self,
        filter: Option<EventFilter>,
        search: Option<&str>,
    ) -> Result<Vec<Event>, EventError>;

    /// Active events on or after `today`, soonest first.
    async fn list_active_upcoming(&self, today: NaiveDate) -> Result<Vec<Event>, EventError>;

    /// The next `limit` upcoming active events.
    async fn upcoming(&self, today: NaiveDate, limit: u64) -> Result<Vec<Event>, EventError>;

    async fn get(&self, id: i32) -> Result<Event, EventError>;

    /// Creates an event after validating title, capacity, times, and date.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Validation`] when the end time does not come
    /// after the start time or the date is in the past.
    async fn create(
        &self,
        input: EventInput,
        created_by: i32,
        today: NaiveDate,
    ) -> Result<Event, EventError>;

    /// Updates an event with the same validation as [`EventService::create`].
    async fn update(
        &self,
        id: i32,
        input: EventInput,
        today: NaiveDate,
    ) -> Result<Event, EventError>;

    async fn delete(&self, id: i32) -> Result<(), EventError>;
}
