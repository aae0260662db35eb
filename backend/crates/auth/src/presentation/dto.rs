//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::Identity;

// ============================================================================
// Register / Login
// ============================================================================

/// Credentials body shared by register and login
///
/// Missing fields deserialize as empty strings so they fail validation
/// instead of the JSON extractor.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Register and login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub id: IdentityId,
    pub user_name: String,
}

/// Logout response
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

// ============================================================================
// Current user
// ============================================================================

/// GET /me response
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: IdentityId,
    pub user_name: String,
    pub worm: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for UserView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            user_name: identity.user_name.as_str().to_string(),
            worm: identity.privileged,
            created_at: identity.created_at,
        }
    }
}

// ============================================================================
// Worms
// ============================================================================

/// GET /worms response
#[derive(Debug, Clone, Serialize)]
pub struct WormsResponse {
    pub worms: Vec<WormView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WormView {
    pub id: IdentityId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for WormView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            user_name: identity.user_name.as_str().to_string(),
            created_at: identity.created_at,
        }
    }
}

/// GET /worm/check response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WormCheckResponse {
    pub ok: bool,
    pub user_name: String,
}
