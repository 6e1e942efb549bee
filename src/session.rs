//! Typed session state: the signed-in user and one-shot flash messages.
//!
//! All session access goes through this module so handlers never touch raw
//! string keys. Flash messages have single-read semantics: taking one
//! removes it from the session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::{Role, User};

const USER_KEY: &str = "user";
const FLASH_KEY: &str = "flash";

/// The authenticated identity carried by a session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

/// A one-time notification message scoped to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

pub async fn current_user(session: &Session) -> Option<SessionUser> {
    session.get::<SessionUser>(USER_KEY).await.ok().flatten()
}

pub async fn sign_in(session: &Session, user: &User) -> anyhow::Result<()> {
    session
        .insert(USER_KEY, SessionUser::from(user))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create session: {e}"))
}

/// Invalidates the whole session, including any pending flash.
pub async fn sign_out(session: &Session) {
    let _ = session.flush().await;
}

pub async fn set_flash(session: &Session, kind: FlashKind, message: impl Into<String>) {
    let flash = Flash {
        kind,
        message: message.into(),
    };
    if let Err(e) = session.insert(FLASH_KEY, flash).await {
        tracing::warn!("Failed to store flash message: {e}");
    }
}

/// Takes the pending flash message, clearing it. Reading destroys it.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(FLASH_KEY).await.ok().flatten()
}
