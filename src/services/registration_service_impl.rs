//! `SeaORM` implementation of the `RegistrationService` trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::Store;
use crate::models::{Registration, RegistrationStatus};
use crate::services::registration_service::{RegistrationError, RegistrationService};

pub struct SeaOrmRegistrationService {
    store: Store,
}

impl SeaOrmRegistrationService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RegistrationService for SeaOrmRegistrationService {
    async fn register(
        &self,
        event_id: i32,
        user_id: i32,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<Registration, RegistrationError> {
        let volunteer = self
            .store
            .get_volunteer_by_user(user_id)
            .await?
            .ok_or(RegistrationError::NoProfile)?;

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(RegistrationError::EventNotFound(event_id))?;

        if !event.is_active() || event.is_past(today) {
            return Err(RegistrationError::EventNotOpen);
        }

        if event.is_full() {
            return Err(RegistrationError::EventFull);
        }

        if self
            .store
            .is_volunteer_registered(event_id, volunteer.id)
            .await?
        {
            return Err(RegistrationError::AlreadyRegistered);
        }

        // A previously cancelled registration is re-confirmed instead of
        // inserted again, keeping the (event, volunteer) pair unique.
        if let Some(existing) = self
            .store
            .get_registration_for(event_id, volunteer.id)
            .await?
        {
            if !self.store.reconfirm_registration(existing.id).await? {
                return Err(RegistrationError::AlreadyRegistered);
            }
            let registration = self
                .store
                .get_registration(existing.id)
                .await?
                .ok_or(RegistrationError::NotFound)?;
            return Ok(registration);
        }

        let notes = notes.map(|n| crate::validation::sanitize(&n)).filter(|n| !n.is_empty());

        Ok(self
            .store
            .register_volunteer(event_id, volunteer.id, notes)
            .await?)
    }

    async fn cancel_own(&self, event_id: i32, user_id: i32) -> Result<(), RegistrationError> {
        let volunteer = self
            .store
            .get_volunteer_by_user(user_id)
            .await?
            .ok_or(RegistrationError::NoProfile)?;

        let registration = self
            .store
            .get_registration_for(event_id, volunteer.id)
            .await?
            .ok_or(RegistrationError::NotFound)?;

        if !self.store.cancel_registration(registration.id).await? {
            return Err(RegistrationError::NotFound);
        }

        Ok(())
    }

    async fn cancel(&self, registration_id: i32) -> Result<(), RegistrationError> {
        if self.store.cancel_registration(registration_id).await? {
            Ok(())
        } else {
            Err(RegistrationError::NotFound)
        }
    }

    async fn mark_attended(&self, registration_id: i32) -> Result<(), RegistrationError> {
        let registration = self
            .store
            .get_registration(registration_id)
            .await?
            .ok_or(RegistrationError::NotFound)?;

        if registration.status != RegistrationStatus::Confirmed {
            return Err(RegistrationError::NotFound);
        }

        self.store
            .update_registration_status(registration_id, RegistrationStatus::Attended)
            .await?;

        Ok(())
    }

    async fn list_for_event(
        &self,
        event_id: i32,
    ) -> Result<Vec<Registration>, RegistrationError> {
        if self.store.get_event(event_id).await?.is_none() {
            return Err(RegistrationError::EventNotFound(event_id));
        }

        Ok(self.store.list_registrations_for_event(event_id).await?)
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Registration>, RegistrationError> {
        let volunteer = self
            .store
            .get_volunteer_by_user(user_id)
            .await?
            .ok_or(RegistrationError::NoProfile)?;

        Ok(self
            .store
            .list_registrations_for_volunteer(volunteer.id)
            .await?)
    }
}
