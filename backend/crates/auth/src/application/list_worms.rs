//! List Worms Use Case
//!
//! Public listing of privileged identities.

use std::sync::Arc;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::CredentialStore;
use crate::error::AuthResult;

pub struct ListWormsUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
}

impl<S> ListWormsUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> AuthResult<Vec<Identity>> {
        self.store
            .list_privileged()
            .await
            .map_err(|e| e.or_internal("Could not fetch worms"))
    }
}
