//! User identity and role model.
//!
//! # Responsibility
//! - Define the stored user record and the role enum used by policy.
//! - Define the `Actor` value the identity provider resolves per request.
//!
//! # Invariants
//! - `UserId` is stable and never reused for another user.
//! - Credentials are opaque to the core; nothing here interprets them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registered user.
pub type UserId = Uuid;

/// Access role attached to every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular member; may mutate only resources they own.
    User,
    /// Administrator; may mutate any resource.
    Admin,
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable global ID used by ownership references.
    pub uuid: UserId,
    /// Unique login/display handle.
    pub username: String,
    /// Opaque credential string; stored, never validated by the core.
    pub password: String,
    pub role: UserRole,
}

impl User {
    /// Creates a new user record with a generated stable ID.
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

/// Authenticated request identity resolved by the identity provider.
///
/// The core trusts this triple as-is; credential checks happened
/// upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub username: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: UserId, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.uuid,
            username: user.username.clone(),
            role: user.role,
        }
    }
}
