use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::{
    Event, EventStatus, Registration, RegistrationStatus, User, Volunteer, VolunteerStatus,
};

pub mod migrator;
pub mod repositories;

pub use repositories::event::EventInput;
pub use repositories::user::NewUser;
pub use repositories::volunteer::ProfileInput;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn volunteer_repo(&self) -> repositories::volunteer::VolunteerRepository {
        repositories::volunteer::VolunteerRepository::new(self.conn.clone())
    }

    fn event_repo(&self) -> repositories::event::EventRepository {
        repositories::event::EventRepository::new(self.conn.clone())
    }

    fn registration_repo(&self) -> repositories::registration::RegistrationRepository {
        repositories::registration::RegistrationRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn create_user(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn authenticate_user(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo()
            .authenticate(username_or_email, password)
            .await
    }

    pub async fn update_user_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    // Volunteers

    pub async fn create_volunteer(&self, user_id: i32, input: &ProfileInput) -> Result<Volunteer> {
        self.volunteer_repo().create(user_id, input).await
    }

    pub async fn get_volunteer(&self, id: i32) -> Result<Option<Volunteer>> {
        self.volunteer_repo().get(id).await
    }

    pub async fn get_volunteer_by_user(&self, user_id: i32) -> Result<Option<Volunteer>> {
        self.volunteer_repo().get_by_user_id(user_id).await
    }

    pub async fn list_volunteers(
        &self,
        status: Option<VolunteerStatus>,
    ) -> Result<Vec<Volunteer>> {
        self.volunteer_repo().find_all(status).await
    }

    pub async fn find_volunteers_by_skill(&self, skill: &str) -> Result<Vec<Volunteer>> {
        self.volunteer_repo().find_by_skill(skill).await
    }

    pub async fn update_volunteer_profile(&self, id: i32, input: &ProfileInput) -> Result<bool> {
        self.volunteer_repo().update_profile(id, input).await
    }

    pub async fn set_volunteer_status(&self, id: i32, status: VolunteerStatus) -> Result<bool> {
        self.volunteer_repo().set_status(id, status).await
    }

    pub async fn delete_volunteer(&self, id: i32) -> Result<bool> {
        self.volunteer_repo().delete_with_user(id).await
    }

    pub async fn count_volunteers_by_status(&self, status: VolunteerStatus) -> Result<u64> {
        self.volunteer_repo().count_by_status(status).await
    }

    // Events

    pub async fn create_event(&self, input: &EventInput, created_by: i32) -> Result<Event> {
        self.event_repo().create(input, created_by).await
    }

    pub async fn get_event(&self, id: i32) -> Result<Option<Event>> {
        self.event_repo().get(id).await
    }

    pub async fn update_event(&self, id: i32, input: &EventInput) -> Result<bool> {
        self.event_repo().update(id, input).await
    }

    pub async fn delete_event(&self, id: i32) -> Result<bool> {
        self.event_repo().delete(id).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.event_repo().find_all().await
    }

    pub async fn list_events_by_category(&self, category: &str) -> Result<Vec<Event>> {
        self.event_repo().find_by_category(category).await
    }

    pub async fn list_events_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        self.event_repo().find_by_status(status).await
    }

    pub async fn list_active_upcoming_events(&self, today: NaiveDate) -> Result<Vec<Event>> {
        self.event_repo().find_active_upcoming(today).await
    }

    pub async fn list_upcoming_events(&self, today: NaiveDate, limit: u64) -> Result<Vec<Event>> {
        self.event_repo().find_upcoming(today, limit).await
    }

    pub async fn search_events(&self, query: &str) -> Result<Vec<Event>> {
        self.event_repo().search(query).await
    }

    pub async fn count_events(&self) -> Result<u64> {
        self.event_repo().count_all().await
    }

    // Registrations

    pub async fn get_registration(&self, id: i32) -> Result<Option<Registration>> {
        self.registration_repo().find_by_id(id).await
    }

    pub async fn get_registration_for(
        &self,
        event_id: i32,
        volunteer_id: i32,
    ) -> Result<Option<Registration>> {
        self.registration_repo()
            .find_by_event_and_volunteer(event_id, volunteer_id)
            .await
    }

    pub async fn list_registrations_for_event(&self, event_id: i32) -> Result<Vec<Registration>> {
        self.registration_repo().find_by_event(event_id).await
    }

    pub async fn list_registrations_for_volunteer(
        &self,
        volunteer_id: i32,
    ) -> Result<Vec<Registration>> {
        self.registration_repo().find_by_volunteer(volunteer_id).await
    }

    pub async fn is_volunteer_registered(&self, event_id: i32, volunteer_id: i32) -> Result<bool> {
        self.registration_repo()
            .is_registered(event_id, volunteer_id)
            .await
    }

    pub async fn register_volunteer(
        &self,
        event_id: i32,
        volunteer_id: i32,
        notes: Option<String>,
    ) -> Result<Registration> {
        self.registration_repo()
            .register(event_id, volunteer_id, notes)
            .await
    }

    pub async fn cancel_registration(&self, id: i32) -> Result<bool> {
        self.registration_repo().cancel(id).await
    }

    pub async fn reconfirm_registration(&self, id: i32) -> Result<bool> {
        self.registration_repo().reconfirm(id).await
    }

    pub async fn update_registration_status(
        &self,
        id: i32,
        status: RegistrationStatus,
    ) -> Result<bool> {
        self.registration_repo().update_status(id, status).await
    }
}
