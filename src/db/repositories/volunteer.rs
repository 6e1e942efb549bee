use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{event_registrations, events, users, volunteers};
use crate::models::{RegistrationStatus, Volunteer, VolunteerStatus};

/// Profile fields a volunteer can edit.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub skills: String,
    pub availability: String,
    pub experience: Option<String>,
    pub interests: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

fn map_volunteer(model: volunteers::Model, user: Option<users::Model>) -> Result<Volunteer> {
    let user = user.ok_or_else(|| {
        anyhow::anyhow!("Volunteer {} has no matching user account", model.id)
    })?;

    let status = model
        .status
        .parse::<VolunteerStatus>()
        .map_err(|e| anyhow::anyhow!("Corrupt volunteer row {}: {e}", model.id))?;

    Ok(Volunteer {
        id: model.id,
        user_id: model.user_id,
        skills: model.skills,
        availability: model.availability,
        experience: model.experience,
        interests: model.interests,
        emergency_contact: model.emergency_contact,
        emergency_phone: model.emergency_phone,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
        username: user.username,
        email: user.email,
        full_name: user.full_name,
        phone: user.phone,
    })
}

pub struct VolunteerRepository {
    conn: DatabaseConnection,
}

impl VolunteerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, input: &ProfileInput) -> Result<Volunteer> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = volunteers::ActiveModel {
            user_id: Set(user_id),
            skills: Set(input.skills.clone()),
            availability: Set(input.availability.clone()),
            experience: Set(input.experience.clone()),
            interests: Set(input.interests.clone()),
            emergency_contact: Set(input.emergency_contact.clone()),
            emergency_phone: Set(input.emergency_phone.clone()),
            status: Set(VolunteerStatus::Active.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert volunteer")?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for new volunteer")?;

        map_volunteer(model, user)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Volunteer>> {
        let result = volunteers::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query volunteer by ID")?;

        result
            .map(|(volunteer, user)| map_volunteer(volunteer, user))
            .transpose()
    }

    pub async fn get_by_user_id(&self, user_id: i32) -> Result<Option<Volunteer>> {
        let result = volunteers::Entity::find()
            .filter(volunteers::Column::UserId.eq(user_id))
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query volunteer by user ID")?;

        result
            .map(|(volunteer, user)| map_volunteer(volunteer, user))
            .transpose()
    }

    pub async fn find_all(&self, status: Option<VolunteerStatus>) -> Result<Vec<Volunteer>> {
        let mut query = volunteers::Entity::find();

        if let Some(status) = status {
            query = query.filter(volunteers::Column::Status.eq(status.as_str()));
        }

        let rows = query
            .order_by_asc(volunteers::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list volunteers")?;

        rows.into_iter()
            .map(|(volunteer, user)| map_volunteer(volunteer, user))
            .collect()
    }

    pub async fn find_by_skill(&self, skill: &str) -> Result<Vec<Volunteer>> {
        let rows = volunteers::Entity::find()
            .filter(volunteers::Column::Skills.contains(skill))
            .order_by_asc(volunteers::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list volunteers by skill")?;

        rows.into_iter()
            .map(|(volunteer, user)| map_volunteer(volunteer, user))
            .collect()
    }

    pub async fn update_profile(&self, id: i32, input: &ProfileInput) -> Result<bool> {
        let Some(existing) = volunteers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query volunteer for update")?
        else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: volunteers::ActiveModel = existing.into();
        active.skills = Set(input.skills.clone());
        active.availability = Set(input.availability.clone());
        active.experience = Set(input.experience.clone());
        active.interests = Set(input.interests.clone());
        active.emergency_contact = Set(input.emergency_contact.clone());
        active.emergency_phone = Set(input.emergency_phone.clone());
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        info!("Volunteer profile updated: {}", id);
        Ok(true)
    }

    pub async fn set_status(&self, id: i32, status: VolunteerStatus) -> Result<bool> {
        let result = volunteers::Entity::update_many()
            .col_expr(volunteers::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                volunteers::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(volunteers::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete a volunteer along with their user account. Confirmed
    /// registrations release their spots before the cascade removes them.
    pub async fn delete_with_user(&self, id: i32) -> Result<bool> {
        let Some(volunteer) = volunteers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query volunteer for deletion")?
        else {
            return Ok(false);
        };

        let txn = self.conn.begin().await?;

        let confirmed = event_registrations::Entity::find()
            .filter(event_registrations::Column::VolunteerId.eq(id))
            .filter(
                event_registrations::Column::Status.eq(RegistrationStatus::Confirmed.as_str()),
            )
            .all(&txn)
            .await?;

        for registration in &confirmed {
            events::Entity::update_many()
                .col_expr(
                    events::Column::VolunteersRegistered,
                    Expr::col(events::Column::VolunteersRegistered).sub(1),
                )
                .filter(events::Column::Id.eq(registration.event_id))
                .exec(&txn)
                .await?;
        }

        event_registrations::Entity::delete_many()
            .filter(event_registrations::Column::VolunteerId.eq(id))
            .exec(&txn)
            .await?;

        volunteers::Entity::delete_by_id(id).exec(&txn).await?;

        let result = users::Entity::delete_by_id(volunteer.user_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Volunteer {} and user account {} deleted", id, volunteer.user_id);
        }
        Ok(removed)
    }

    pub async fn count_by_status(&self, status: VolunteerStatus) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        volunteers::Entity::find()
            .filter(volunteers::Column::Status.eq(status.as_str()))
            .count(&self.conn)
            .await
            .context("Failed to count volunteers")
    }
}
