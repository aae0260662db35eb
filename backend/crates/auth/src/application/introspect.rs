//! Introspect Use Case
//!
//! Resolves the authenticated caller to its stored identity.

use std::sync::Arc;

use crate::domain::entity::{auth_context::AuthContext, identity::Identity};
use crate::domain::repository::CredentialStore;
use crate::error::{AuthError, AuthResult};

pub struct IntrospectUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
}

impl<S> IntrospectUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `IdentityNotFound` when the identity was removed after the token
    /// was issued
    pub async fn execute(&self, context: &AuthContext) -> AuthResult<Identity> {
        self.store
            .find_by_id(context.id)
            .await
            .map_err(|e| e.or_internal("Internal server error"))?
            .ok_or(AuthError::IdentityNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };
    use crate::infra::memory::MemoryCredentialStore;
    use kernel::id::IdentityId;
    use platform::password::HashCost;

    #[tokio::test]
    async fn test_found_and_missing() {
        let store = MemoryCredentialStore::new();
        let hash =
            UserPassword::hash(&RawPassword::new("x".to_string()), &HashCost::minimal()).unwrap();
        let created = store
            .create(&UserName::new("worm").unwrap(), &hash)
            .await
            .unwrap();
        let use_case = IntrospectUseCase::new(Arc::new(store));

        let ctx = AuthContext {
            id: created.id,
            user_name: "worm".to_string(),
            privileged: false,
        };
        let identity = use_case.execute(&ctx).await.unwrap();
        assert_eq!(identity.user_name.as_str(), "worm");

        let ghost = AuthContext {
            id: IdentityId::new(999),
            ..ctx
        };
        assert!(matches!(
            use_case.execute(&ghost).await,
            Err(AuthError::IdentityNotFound)
        ));
    }
}
