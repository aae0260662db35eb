//! Request-scoped authentication context

use kernel::id::IdentityId;

use crate::domain::entity::claims::Claims;

/// Who is making the request, as proven by a verified session token
///
/// Derived from claims on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub id: IdentityId,
    pub user_name: String,
    pub privileged: bool,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.subject_id,
            user_name: claims.user_name,
            privileged: claims.privileged,
        }
    }
}
