//! Identity Entity
//!
//! A registered account as the credential store holds it.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;

use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};

/// Identity entity
///
/// Owned by the credential store; the auth core only reads it.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Store-assigned key
    pub id: IdentityId,
    /// Unique login handle
    pub user_name: UserName,
    /// Argon2id PHC string
    pub password_hash: UserPassword,
    /// Privileged ("worm") capability
    pub privileged: bool,
    pub created_at: DateTime<Utc>,
}
