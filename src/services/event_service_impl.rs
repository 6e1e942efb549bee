//! `SeaORM` implementation of the `EventService` trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{EventInput, Store};
use crate::models::Event;
use crate::services::event_service::{EventError, EventFilter, EventService};
use crate::validation::{sanitize, validate_event_date, validate_event_times};

pub struct SeaOrmEventService {
    store: Store,
}

impl SeaOrmEventService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Sanitizes free-text fields and checks the semantic rules every event
    /// write must satisfy.
    fn prepare(mut input: EventInput, today: NaiveDate) -> Result<EventInput, EventError> {
        input.title = sanitize(&input.title);
        input.description = input
            .description
            .as_deref()
            .map(sanitize)
            .filter(|d| !d.is_empty());
        input.location = input
            .location
            .as_deref()
            .map(sanitize)
            .filter(|l| !l.is_empty());
        input.category = sanitize(&input.category);

        if input.title.is_empty() {
            return Err(EventError::Validation("Title is required".to_string()));
        }

        if input.category.is_empty() {
            return Err(EventError::Validation("Category is required".to_string()));
        }

        if input.volunteers_needed < 1 {
            return Err(EventError::Validation(
                "At least one volunteer is needed".to_string(),
            ));
        }

        validate_event_times(input.start_time, input.end_time).map_err(EventError::Validation)?;
        validate_event_date(input.event_date, today).map_err(EventError::Validation)?;

        Ok(input)
    }
}

#[async_trait]
impl EventService for SeaOrmEventService {
    async fn list(
        &self,
        filter: Option<EventFilter>,
        search: Option<&str>,
    ) -> Result<Vec<Event>, EventError> {
        let search = search.map(str::trim).filter(|q| !q.is_empty());

        let mut events = match (&filter, search) {
            (None, Some(query)) => return Ok(self.store.search_events(query).await?),
            (Some(EventFilter::Category(category)), _) => {
                self.store.list_events_by_category(category).await?
            }
            (Some(EventFilter::Status(status)), _) => {
                self.store.list_events_by_status(*status).await?
            }
            (None, None) => self.store.list_events().await?,
        };

        if let Some(query) = search {
            let query = query.to_lowercase();
            events.retain(|event| {
                event.title.to_lowercase().contains(&query)
                    || event
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&query))
                    || event
                        .location
                        .as_ref()
                        .is_some_and(|l| l.to_lowercase().contains(&query))
            });
        }

        Ok(events)
    }

    async fn list_active_upcoming(&self, today: NaiveDate) -> Result<Vec<Event>, EventError> {
        Ok(self.store.list_active_upcoming_events(today).await?)
    }

    async fn upcoming(&self, today: NaiveDate, limit: u64) -> Result<Vec<Event>, EventError> {
        Ok(self.store.list_upcoming_events(today, limit).await?)
    }

    async fn get(&self, id: i32) -> Result<Event, EventError> {
        self.store
            .get_event(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    async fn create(
        &self,
        input: EventInput,
        created_by: i32,
        today: NaiveDate,
    ) -> Result<Event, EventError> {
        let input = Self::prepare(input, today)?;
        Ok(self.store.create_event(&input, created_by).await?)
    }

    async fn update(
        &self,
        id: i32,
        input: EventInput,
        today: NaiveDate,
    ) -> Result<Event, EventError> {
        let input = Self::prepare(input, today)?;

        if !self.store.update_event(id, &input).await? {
            return Err(EventError::NotFound(id));
        }

        self.get(id).await
    }

    async fn delete(&self, id: i32) -> Result<(), EventError> {
        if self.store.delete_event(id).await? {
            Ok(())
        } else {
            Err(EventError::NotFound(id))
        }
    }
}
