use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{event_registrations, events, users};
use crate::models::{Event, EventStatus};

/// Field set shared by event creation and update.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub volunteers_needed: i32,
    pub category: String,
    pub status: EventStatus,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("Invalid date: {value}"))
}

pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .with_context(|| format!("Invalid time: {value}"))
}

fn map_event(model: events::Model, creator: Option<users::Model>) -> Result<Event> {
    let status = model
        .status
        .parse::<EventStatus>()
        .map_err(|e| anyhow::anyhow!("Corrupt event row {}: {e}", model.id))?;

    Ok(Event {
        id: model.id,
        title: model.title,
        description: model.description,
        location: model.location,
        event_date: parse_date(&model.event_date)?,
        start_time: parse_time(&model.start_time)?,
        end_time: parse_time(&model.end_time)?,
        volunteers_needed: model.volunteers_needed,
        volunteers_registered: model.volunteers_registered,
        category: model.category,
        status,
        created_by: model.created_by,
        creator_name: creator.map(|u| u.full_name),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: &EventInput, created_by: i32) -> Result<Event> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = events::ActiveModel {
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            location: Set(input.location.clone()),
            event_date: Set(input.event_date.format(DATE_FORMAT).to_string()),
            start_time: Set(input.start_time.format(TIME_FORMAT).to_string()),
            end_time: Set(input.end_time.format(TIME_FORMAT).to_string()),
            volunteers_needed: Set(input.volunteers_needed),
            volunteers_registered: Set(0),
            category: Set(input.category.clone()),
            status: Set(input.status.as_str().to_string()),
            created_by: Set(created_by),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert event")?;

        info!("Event created: {} (ID: {})", model.title, model.id);
        map_event(model, None)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Event>> {
        let result = events::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query event by ID")?;

        result
            .map(|(event, creator)| map_event(event, creator))
            .transpose()
    }

    pub async fn update(&self, id: i32, input: &EventInput) -> Result<bool> {
        let Some(existing) = events::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query event for update")?
        else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: events::ActiveModel = existing.into();
        active.title = Set(input.title.clone());
        active.description = Set(input.description.clone());
        active.location = Set(input.location.clone());
        active.event_date = Set(input.event_date.format(DATE_FORMAT).to_string());
        active.start_time = Set(input.start_time.format(TIME_FORMAT).to_string());
        active.end_time = Set(input.end_time.format(TIME_FORMAT).to_string());
        active.volunteers_needed = Set(input.volunteers_needed);
        active.category = Set(input.category.clone());
        active.status = Set(input.status.as_str().to_string());
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        info!("Event updated: {}", id);
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        event_registrations::Entity::delete_many()
            .filter(event_registrations::Column::EventId.eq(id))
            .exec(&txn)
            .await?;

        let result = events::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Event deleted: {}", id);
        }
        Ok(removed)
    }

    pub async fn find_all(&self) -> Result<Vec<Event>> {
        let rows = events::Entity::find()
            .order_by_desc(events::Column::EventDate)
            .order_by_desc(events::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list events")?;

        rows.into_iter()
            .map(|(event, creator)| map_event(event, creator))
            .collect()
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Event>> {
        let rows = events::Entity::find()
            .filter(events::Column::Category.eq(category))
            .order_by_desc(events::Column::EventDate)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list events by category")?;

        rows.into_iter()
            .map(|(event, creator)| map_event(event, creator))
            .collect()
    }

    pub async fn find_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        let rows = events::Entity::find()
            .filter(events::Column::Status.eq(status.as_str()))
            .order_by_desc(events::Column::EventDate)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list events by status")?;

        rows.into_iter()
            .map(|(event, creator)| map_event(event, creator))
            .collect()
    }

    /// Active events on or after `today`, soonest first.
    pub async fn find_active_upcoming(&self, today: NaiveDate) -> Result<Vec<Event>> {
        let rows = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Active.as_str()))
            .filter(events::Column::EventDate.gte(today.format(DATE_FORMAT).to_string()))
            .order_by_asc(events::Column::EventDate)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list upcoming events")?;

        rows.into_iter()
            .map(|(event, creator)| map_event(event, creator))
            .collect()
    }

    pub async fn find_upcoming(&self, today: NaiveDate, limit: u64) -> Result<Vec<Event>> {
        let rows = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Active.as_str()))
            .filter(events::Column::EventDate.gte(today.format(DATE_FORMAT).to_string()))
            .order_by_asc(events::Column::EventDate)
            .limit(limit)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list upcoming events")?;

        rows.into_iter()
            .map(|(event, creator)| map_event(event, creator))
            .collect()
    }

    /// Case-insensitive substring search over title, description, and location.
    pub async fn search(&self, query: &str) -> Result<Vec<Event>> {
        let rows = events::Entity::find()
            .filter(
                Condition::any()
                    .add(events::Column::Title.contains(query))
                    .add(events::Column::Description.contains(query))
                    .add(events::Column::Location.contains(query)),
            )
            .order_by_desc(events::Column::EventDate)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to search events")?;

        rows.into_iter()
            .map(|(event, creator)| map_event(event, creator))
            .collect()
    }

    pub async fn count_all(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        events::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count events")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-04-18").is_ok());
        assert!(parse_date("18/04/2026").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_time_accepts_seconds() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("09:30:15").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
        assert!(parse_time("9am").is_err());
    }
}
