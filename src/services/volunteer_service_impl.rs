//! `SeaORM` implementation of the `VolunteerService` trait.

use async_trait::async_trait;

use crate::db::{ProfileInput, Store};
use crate::models::{Volunteer, VolunteerStatus};
use crate::services::volunteer_service::{VolunteerError, VolunteerService};
use crate::validation::{clean_phone, is_valid_phone, sanitize};

pub struct SeaOrmVolunteerService {
    store: Store,
}

impl SeaOrmVolunteerService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn prepare(mut input: ProfileInput) -> Result<ProfileInput, VolunteerError> {
        input.skills = sanitize(&input.skills);
        input.availability = sanitize(&input.availability);
        input.experience = input
            .experience
            .as_deref()
            .map(sanitize)
            .filter(|e| !e.is_empty());
        input.interests = input
            .interests
            .as_deref()
            .map(sanitize)
            .filter(|i| !i.is_empty());
        input.emergency_contact = sanitize(&input.emergency_contact);
        input.emergency_phone = input.emergency_phone.trim().to_string();

        if input.skills.is_empty() {
            return Err(VolunteerError::Validation(
                "Please enter your skills".to_string(),
            ));
        }

        if input.availability.is_empty() {
            return Err(VolunteerError::Validation(
                "Please enter your availability".to_string(),
            ));
        }

        if input.emergency_contact.is_empty() {
            return Err(VolunteerError::Validation(
                "Please enter an emergency contact name".to_string(),
            ));
        }

        if input.emergency_phone.is_empty() {
            return Err(VolunteerError::Validation(
                "Please enter an emergency contact phone".to_string(),
            ));
        }

        if !is_valid_phone(&input.emergency_phone) {
            return Err(VolunteerError::Validation(
                "Please enter a valid phone number".to_string(),
            ));
        }

        // Stored digits-only once validated
        input.emergency_phone = clean_phone(&input.emergency_phone);

        Ok(input)
    }
}

#[async_trait]
impl VolunteerService for SeaOrmVolunteerService {
    async fn list(
        &self,
        status: Option<VolunteerStatus>,
    ) -> Result<Vec<Volunteer>, VolunteerError> {
        Ok(self.store.list_volunteers(status).await?)
    }

    async fn find_by_skill(&self, skill: &str) -> Result<Vec<Volunteer>, VolunteerError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(VolunteerError::Validation(
                "Search skill cannot be empty".to_string(),
            ));
        }
        Ok(self.store.find_volunteers_by_skill(skill).await?)
    }

    async fn get(&self, id: i32) -> Result<Volunteer, VolunteerError> {
        self.store
            .get_volunteer(id)
            .await?
            .ok_or(VolunteerError::NotFound(id))
    }

    async fn get_by_user(&self, user_id: i32) -> Result<Volunteer, VolunteerError> {
        self.store
            .get_volunteer_by_user(user_id)
            .await?
            .ok_or(VolunteerError::NoProfile)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        input: ProfileInput,
    ) -> Result<Volunteer, VolunteerError> {
        let input = Self::prepare(input)?;

        let volunteer = self.get_by_user(user_id).await?;

        if !self
            .store
            .update_volunteer_profile(volunteer.id, &input)
            .await?
        {
            return Err(VolunteerError::NotFound(volunteer.id));
        }

        self.get(volunteer.id).await
    }

    async fn set_status(
        &self,
        id: i32,
        status: VolunteerStatus,
    ) -> Result<Volunteer, VolunteerError> {
        if !self.store.set_volunteer_status(id, status).await? {
            return Err(VolunteerError::NotFound(id));
        }

        self.get(id).await
    }

    async fn delete(&self, id: i32) -> Result<(), VolunteerError> {
        if self.store.delete_volunteer(id).await? {
            Ok(())
        } else {
            Err(VolunteerError::NotFound(id))
        }
    }
}
