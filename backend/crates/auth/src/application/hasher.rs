//! Credential Hasher
//!
//! Runs Argon2id hashing and verification on tokio's blocking pool, at most
//! `workers` at a time.

use std::sync::Arc;

use platform::crypto;
use platform::password::HashCost;
use tokio::sync::{OnceCell, Semaphore};

use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct CredentialHasher {
    cost: HashCost,
    permits: Arc<Semaphore>,
    /// Hash of a random secret, verified against when the user is unknown
    decoy: OnceCell<UserPassword>,
}

impl CredentialHasher {
    pub fn new(cost: HashCost, workers: usize) -> Self {
        Self {
            cost,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            decoy: OnceCell::new(),
        }
    }

    pub fn cost(&self) -> &HashCost {
        &self.cost
    }

    /// Hash a new password
    pub async fn hash(&self, password: RawPassword) -> AuthResult<UserPassword> {
        let cost = self.cost;
        self.run_blocking(move || {
            UserPassword::hash(&password, &cost)
                .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))
        })
        .await?
    }

    /// Verify a password against a stored hash
    pub async fn verify(&self, password: RawPassword, hash: UserPassword) -> AuthResult<bool> {
        self.run_blocking(move || hash.verify(&password)).await
    }

    /// Spend one verification against the decoy hash
    ///
    /// Used when the user name is unknown, so that path costs the same as a
    /// wrong password.
    pub async fn verify_decoy(&self, password: RawPassword) -> AuthResult<()> {
        let decoy = self
            .decoy
            .get_or_try_init(|| async {
                let secret = crypto::to_base64url(&crypto::random_bytes(32));
                self.hash(RawPassword::new(secret)).await
            })
            .await?
            .clone();

        let _ = self.verify(password, decoy).await?;
        Ok(())
    }

    async fn run_blocking<T, F>(&self, work: F) -> AuthResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AuthError::Internal("Hasher pool closed".to_string()))?;

        tokio::task::spawn_blocking(move || {
            // Held until the work finishes, even if the caller goes away
            let _permit = permit;
            work()
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Hasher task failed: {e}")))
    }
}
