use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

use super::event::{parse_date, parse_time};
use crate::entities::{event_registrations, events, users, volunteers};
use crate::models::{Registration, RegistrationStatus};

fn map_registration(model: event_registrations::Model) -> Result<Registration> {
    let status = model
        .status
        .parse::<RegistrationStatus>()
        .map_err(|e| anyhow::anyhow!("Corrupt registration row {}: {e}", model.id))?;

    Ok(Registration {
        id: model.id,
        event_id: model.event_id,
        volunteer_id: model.volunteer_id,
        status,
        notes: model.notes,
        registered_at: model.registered_at,
        updated_at: model.updated_at,
        event_title: None,
        event_date: None,
        event_start_time: None,
        event_end_time: None,
        event_location: None,
        volunteer_name: None,
    })
}

pub struct RegistrationRepository {
    conn: DatabaseConnection,
}

impl RegistrationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Registration>> {
        let row = event_registrations::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query registration by ID")?;

        row.map(map_registration).transpose()
    }

    pub async fn find_by_event_and_volunteer(
        &self,
        event_id: i32,
        volunteer_id: i32,
    ) -> Result<Option<Registration>> {
        let row = event_registrations::Entity::find()
            .filter(event_registrations::Column::EventId.eq(event_id))
            .filter(event_registrations::Column::VolunteerId.eq(volunteer_id))
            .one(&self.conn)
            .await
            .context("Failed to query registration by event and volunteer")?;

        row.map(map_registration).transpose()
    }

    /// Registrations for one event, oldest first, with volunteer names for
    /// the roster view.
    pub async fn find_by_event(&self, event_id: i32) -> Result<Vec<Registration>> {
        let rows = event_registrations::Entity::find()
            .filter(event_registrations::Column::EventId.eq(event_id))
            .order_by_asc(event_registrations::Column::RegisteredAt)
            .find_also_related(volunteers::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list registrations for event")?;

        let user_ids: Vec<i32> = rows
            .iter()
            .filter_map(|(_, v)| v.as_ref().map(|v| v.user_id))
            .collect();

        let names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.conn)
            .await
            .context("Failed to query volunteer names")?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();

        rows.into_iter()
            .map(|(model, volunteer)| {
                let mut registration = map_registration(model)?;
                registration.volunteer_name = volunteer
                    .as_ref()
                    .and_then(|v| names.get(&v.user_id).cloned());
                Ok(registration)
            })
            .collect()
    }

    /// A volunteer's registrations, newest first, with event details for
    /// the dashboard.
    pub async fn find_by_volunteer(&self, volunteer_id: i32) -> Result<Vec<Registration>> {
        let rows = event_registrations::Entity::find()
            .filter(event_registrations::Column::VolunteerId.eq(volunteer_id))
            .order_by_desc(event_registrations::Column::RegisteredAt)
            .find_also_related(events::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list registrations for volunteer")?;

        rows.into_iter()
            .map(|(model, event)| {
                let mut registration = map_registration(model)?;
                if let Some(event) = event {
                    registration.event_title = Some(event.title);
                    registration.event_date = Some(parse_date(&event.event_date)?);
                    registration.event_start_time = Some(parse_time(&event.start_time)?);
                    registration.event_end_time = Some(parse_time(&event.end_time)?);
                    registration.event_location = event.location;
                }
                Ok(registration)
            })
            .collect()
    }

    /// Whether the volunteer holds a non-cancelled registration for the event.
    pub async fn is_registered(&self, event_id: i32, volunteer_id: i32) -> Result<bool> {
        use sea_orm::PaginatorTrait;

        let count = event_registrations::Entity::find()
            .filter(event_registrations::Column::EventId.eq(event_id))
            .filter(event_registrations::Column::VolunteerId.eq(volunteer_id))
            .filter(
                event_registrations::Column::Status.ne(RegistrationStatus::Cancelled.as_str()),
            )
            .count(&self.conn)
            .await
            .context("Failed to check registration status")?;

        Ok(count > 0)
    }

    /// Insert a confirmed registration and take one spot on the event, in
    /// one transaction.
    pub async fn register(
        &self,
        event_id: i32,
        volunteer_id: i32,
        notes: Option<String>,
    ) -> Result<Registration> {
        let now = chrono::Utc::now().to_rfc3339();

        let txn = self.conn.begin().await?;

        let active = event_registrations::ActiveModel {
            event_id: Set(event_id),
            volunteer_id: Set(volunteer_id),
            status: Set(RegistrationStatus::Confirmed.as_str().to_string()),
            notes: Set(notes),
            registered_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&txn)
            .await
            .context("Failed to insert registration")?;

        events::Entity::update_many()
            .col_expr(
                events::Column::VolunteersRegistered,
                Expr::col(events::Column::VolunteersRegistered).add(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            "Volunteer {} registered for event {}",
            volunteer_id, event_id
        );
        map_registration(model)
    }

    /// Mark a confirmed registration cancelled and release its spot, in one
    /// transaction. Returns false if the registration is not confirmed.
    pub async fn cancel(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(existing) = event_registrations::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        if existing.status != RegistrationStatus::Confirmed.as_str() {
            txn.rollback().await?;
            return Ok(false);
        }

        let event_id = existing.event_id;
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: event_registrations::ActiveModel = existing.into();
        active.status = Set(RegistrationStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(Some(now));
        active.update(&txn).await?;

        events::Entity::update_many()
            .col_expr(
                events::Column::VolunteersRegistered,
                Expr::col(events::Column::VolunteersRegistered).sub(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Registration {} cancelled", id);
        Ok(true)
    }

    /// Re-confirm a cancelled registration and take its spot back, in one
    /// transaction. Returns false unless the registration is cancelled.
    pub async fn reconfirm(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(existing) = event_registrations::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        if existing.status != RegistrationStatus::Cancelled.as_str() {
            txn.rollback().await?;
            return Ok(false);
        }

        let event_id = existing.event_id;
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: event_registrations::ActiveModel = existing.into();
        active.status = Set(RegistrationStatus::Confirmed.as_str().to_string());
        active.updated_at = Set(Some(now));
        active.update(&txn).await?;

        events::Entity::update_many()
            .col_expr(
                events::Column::VolunteersRegistered,
                Expr::col(events::Column::VolunteersRegistered).add(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Registration {} re-confirmed", id);
        Ok(true)
    }

    pub async fn update_status(&self, id: i32, status: RegistrationStatus) -> Result<bool> {
        let result = event_registrations::Entity::update_many()
            .col_expr(
                event_registrations::Column::Status,
                Expr::value(status.as_str()),
            )
            .col_expr(
                event_registrations::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(event_registrations::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
