//! Register Use Case
//!
//! Creates a new, non-privileged identity.

use std::sync::Arc;

use kernel::id::IdentityId;
use platform::password::PasswordPolicy;

use crate::application::hasher::CredentialHasher;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword};
use crate::error::AuthResult;

/// Client-facing message for any failure past validation
const CREATE_FAILED: &str = "Could not create user";

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub password: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub id: IdentityId,
    pub user_name: UserName,
}

/// Register use case
pub struct RegisterUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: Arc<CredentialHasher>,
    policy: PasswordPolicy,
}

impl<S> RegisterUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, hasher: Arc<CredentialHasher>) -> Self {
        Self {
            store,
            hasher,
            policy: PasswordPolicy::default(),
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Password rules first, so a weak password is reported even when the
        // name is also bad
        let password = RawPassword::validated(input.password, &self.policy)?;
        let user_name = UserName::new(input.user_name)?;

        let password_hash = self
            .hasher
            .hash(password)
            .await
            .map_err(|e| e.or_internal(CREATE_FAILED))?;

        // The store's uniqueness constraint is the only duplicate check
        let identity = self
            .store
            .create(&user_name, &password_hash)
            .await
            .map_err(|e| e.or_internal(CREATE_FAILED))?;

        tracing::info!(
            user_id = %identity.id,
            user_name = %identity.user_name,
            "User registered"
        );

        Ok(RegisterOutput {
            id: identity.id,
            user_name: identity.user_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::infra::memory::MemoryCredentialStore;
    use platform::password::{HashCost, PasswordViolation};

    fn use_case() -> (RegisterUseCase<MemoryCredentialStore>, MemoryCredentialStore) {
        let store = MemoryCredentialStore::new();
        let hasher = Arc::new(CredentialHasher::new(HashCost::minimal(), 2));
        (RegisterUseCase::new(Arc::new(store.clone()), hasher), store)
    }

    fn input(user_name: &str, password: &str) -> RegisterInput {
        RegisterInput {
            user_name: user_name.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_plain_identity() {
        let (use_case, store) = use_case();
        let out = use_case.execute(input("worm", "Tr0ub4dor&3ZQ!#x")).await.unwrap();

        assert_eq!(out.user_name.as_str(), "worm");
        let stored = store.find_by_id(out.id).await.unwrap().unwrap();
        assert!(!stored.privileged);
        assert!(stored.password_hash.as_phc_string().starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_weak_password_lists_every_violation() {
        let (use_case, store) = use_case();
        let err = use_case.execute(input("worm", "short")).await.unwrap_err();

        match err {
            AuthError::PasswordPolicy(v) => assert_eq!(v.len(), 4),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_weak_password_reported_before_bad_name() {
        let (use_case, _) = use_case();
        let err = use_case.execute(input("", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::PasswordPolicy(_)));
    }

    #[tokio::test]
    async fn test_empty_user_name() {
        let (use_case, _) = use_case();
        let err = use_case.execute(input("  ", "Tr0ub4dor&3ZQ!#x")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidUserName(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let (use_case, _) = use_case();
        use_case.execute(input("worm", "Tr0ub4dor&3ZQ!#x")).await.unwrap();
        let err = use_case
            .execute(input("worm", "An0ther&P4ss!#W9"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNameTaken));
    }

    #[tokio::test]
    async fn test_two_symbol_password_rejected() {
        let (use_case, _) = use_case();
        match use_case.execute(input("worm", "Tr0ub4dor&3ZQ!")).await {
            Err(AuthError::PasswordPolicy(v)) => assert_eq!(
                v,
                vec![PasswordViolation::TooShort, PasswordViolation::TooFewSymbols]
            ),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
