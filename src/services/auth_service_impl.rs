//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{NewUser, ProfileInput, Store};
use crate::models::{Role, User};
use crate::services::auth_service::{AuthError, AuthService, RegisterInput};
use crate::validation::{
    is_valid_email, is_valid_password, is_valid_phone, is_valid_username, sanitize,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_register(input: &RegisterInput) -> Result<(), AuthError> {
        if !is_valid_username(&input.username) {
            return Err(AuthError::Validation(
                "Username must be 3-20 alphanumeric characters or underscores".to_string(),
            ));
        }

        if !is_valid_email(&input.email) {
            return Err(AuthError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }

        if !is_valid_password(&input.password) {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters with uppercase, lowercase, and number"
                    .to_string(),
            ));
        }

        if input.password != input.confirm_password {
            return Err(AuthError::Validation("Fields do not match".to_string()));
        }

        if input.full_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "Full name is required".to_string(),
            ));
        }

        if let Some(phone) = &input.phone
            && !phone.trim().is_empty()
            && !is_valid_phone(phone)
        {
            return Err(AuthError::Validation(
                "Please enter a valid phone number".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        Self::validate_register(&input)?;

        if self.store.username_exists(&input.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        if self.store.email_exists(&input.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let phone = input
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string);

        let new_user = NewUser {
            username: input.username,
            email: input.email,
            password: input.password,
            full_name: sanitize(&input.full_name),
            phone,
            role: Role::Volunteer,
        };

        let user = self.store.create_user(new_user, &self.security).await?;

        // Every volunteer account starts with an empty profile row.
        self.store
            .create_volunteer(user.id, &ProfileInput::default())
            .await?;

        tracing::info!("Registered new volunteer account: {}", user.username);

        Ok(user)
    }

    async fn login(&self, username_or_email: &str, password: &str) -> Result<User, AuthError> {
        if username_or_email.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let user = self
            .store
            .authenticate_user(username_or_email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if !is_valid_password(new_password) {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters with uppercase, lowercase, and number"
                    .to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let is_valid = self
            .store
            .authenticate_user(&user.username, current_password)
            .await?
            .is_some();

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        tracing::info!("Password changed for user: {}", user.username);

        Ok(())
    }
}
