use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type UserId = Uuid;

/// A local account. OAuth-created accounts have no password hash: they can
/// only sign in through the provider that vouched for their email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. `None` for accounts finalized from an OAuth signup.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    pub fn is_oauth_only(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Per-user auxiliary data: bio text and a savings target.
/// Exactly one profile exists per user; it is created lazily on first access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub bio: String,
    pub target_savings_cents: Cents,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            bio: String::new(),
            target_savings_cents: 0,
            updated_at: Utc::now(),
        }
    }
}
