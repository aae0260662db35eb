//! Login Use Case
//!
//! Checks credentials and issues a session token.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::IdentityId;

use crate::application::hasher::CredentialHasher;
use crate::application::token::TokenIssuer;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Client-facing message for store or crypto failures
const LOGIN_FAILED: &str = "Login failed";

/// Login input
pub struct LoginInput {
    pub user_name: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub id: IdentityId,
    pub user_name: UserName,
    /// Session token for the cookie
    pub token: String,
}

impl std::fmt::Debug for LoginOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOutput")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Login use case
pub struct LoginUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: Arc<CredentialHasher>,
    issuer: Arc<TokenIssuer>,
}

impl<S> LoginUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, hasher: Arc<CredentialHasher>, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            hasher,
            issuer,
        }
    }

    /// Unknown names, wrong passwords and missing fields all end in
    /// `InvalidCredentials`, after the same amount of hashing work.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let password = RawPassword::new(input.password);

        let identity = match UserName::new(input.user_name) {
            Ok(user_name) => self
                .store
                .find_by_name(&user_name)
                .await
                .map_err(|e| e.or_internal(LOGIN_FAILED))?,
            Err(_) => None,
        };

        let Some(identity) = identity else {
            self.hasher
                .verify_decoy(password)
                .await
                .map_err(|e| e.or_internal(LOGIN_FAILED))?;
            return Err(AuthError::InvalidCredentials);
        };

        let password_ok = self
            .hasher
            .verify(password, identity.password_hash.clone())
            .await
            .map_err(|e| e.or_internal(LOGIN_FAILED))?;
        if !password_ok {
            return Err(AuthError::InvalidCredentials);
        }

        let claims = self.issuer.claims_for(&identity, Utc::now());
        let token = self.issuer.issue(&claims).map_err(|e| {
            AuthError::Internal(format!("Token issue failed: {e}")).or_internal(LOGIN_FAILED)
        })?;

        tracing::info!(
            user_id = %identity.id,
            privileged = identity.privileged,
            "User logged in"
        );

        Ok(LoginOutput {
            id: identity.id,
            user_name: identity.user_name,
            token,
        })
    }
}
