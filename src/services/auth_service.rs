//! Domain service for authentication and account management.
//!
//! Handles registration, login, and password changes. Sessions themselves
//! are owned by the web layer; this service only verifies and mutates
//! accounts.

use thiserror::Error;

use crate::models::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Fields submitted on the registration form. New accounts always get the
/// volunteer role; the admin account is seeded by migration.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a volunteer account with an empty profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for malformed fields and
    /// [`AuthError::UsernameTaken`] / [`AuthError::EmailTaken`] for
    /// duplicates.
    async fn register(&self, input: RegisterInput) -> Result<User, AuthError>;

    /// Verifies credentials by username or email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username_or_email: &str, password: &str) -> Result<User, AuthError>;

    /// Gets a user by id.
    async fn get_user(&self, user_id: i32) -> Result<User, AuthError>;

    /// Changes a user's password after verifying the current one.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
