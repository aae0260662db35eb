//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::IdentityId;

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::AuthResult;

/// Credential store trait
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Find identity by exact user name
    async fn find_by_name(&self, user_name: &UserName) -> AuthResult<Option<Identity>>;

    /// Find identity by ID
    async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>>;

    /// Create a non-privileged identity
    ///
    /// Fails with `AuthError::UserNameTaken` when the name exists; this is
    /// the only uniqueness check.
    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<Identity>;

    /// All privileged identities, ordered by ID
    async fn list_privileged(&self) -> AuthResult<Vec<Identity>>;
}
