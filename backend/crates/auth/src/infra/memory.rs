//! In-Memory Credential Store
//!
//! Used by tests, and by the server in development when no database is
//! configured. Contents are lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use kernel::id::IdentityId;
use tokio::sync::RwLock;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    by_id: BTreeMap<IdentityId, Identity>,
    by_name: HashMap<String, IdentityId>,
}

/// Credential store held in process memory
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or revoke the privileged flag. Returns false for unknown IDs.
    pub async fn set_privileged(&self, id: IdentityId, privileged: bool) -> bool {
        let mut state = self.state.write().await;
        match state.by_id.get_mut(&id) {
            Some(identity) => {
                identity.privileged = privileged;
                true
            }
            None => false,
        }
    }

    /// Remove an identity. Returns false for unknown IDs.
    pub async fn remove(&self, id: IdentityId) -> bool {
        let mut state = self.state.write().await;
        match state.by_id.remove(&id) {
            Some(identity) => {
                state.by_name.remove(identity.user_name.as_str());
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.by_id.len()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_by_name(&self, user_name: &UserName) -> AuthResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state
            .by_name
            .get(user_name.as_str())
            .and_then(|id| state.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>> {
        Ok(self.state.read().await.by_id.get(&id).cloned())
    }

    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<Identity> {
        // Check and insert under one write lock
        let mut state = self.state.write().await;
        if state.by_name.contains_key(user_name.as_str()) {
            return Err(AuthError::UserNameTaken);
        }

        state.next_id += 1;
        let identity = Identity {
            id: IdentityId::new(state.next_id),
            user_name: user_name.clone(),
            password_hash: password_hash.clone(),
            privileged: false,
            created_at: Utc::now(),
        };
        state
            .by_name
            .insert(user_name.as_str().to_string(), identity.id);
        state.by_id.insert(identity.id, identity.clone());

        Ok(identity)
    }

    async fn list_privileged(&self) -> AuthResult<Vec<Identity>> {
        let state = self.state.read().await;
        Ok(state
            .by_id
            .values()
            .filter(|identity| identity.privileged)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;
    use platform::password::HashCost;

    fn hash() -> UserPassword {
        UserPassword::hash(&RawPassword::new("x".to_string()), &HashCost::minimal()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryCredentialStore::new();
        let name = UserName::new("worm").unwrap();
        let created = store.create(&name, &hash()).await.unwrap();

        assert_eq!(created.id, IdentityId::new(1));
        let by_name = store.find_by_name(&name).await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.user_name, name);
        assert!(store
            .find_by_name(&UserName::new("Worm").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = MemoryCredentialStore::new();
        let name = UserName::new("worm").unwrap();
        store.create(&name, &hash()).await.unwrap();
        assert!(matches!(
            store.create(&name, &hash()).await,
            Err(AuthError::UserNameTaken)
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_single_winner() {
        let store = MemoryCredentialStore::new();
        let name = UserName::new("race").unwrap();
        let h = hash();

        let (a, b) = tokio::join!(store.create(&name, &h), store.create(&name, &h));
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_frees_name() {
        let store = MemoryCredentialStore::new();
        let name = UserName::new("worm").unwrap();
        let created = store.create(&name, &hash()).await.unwrap();

        assert!(store.remove(created.id).await);
        assert!(!store.remove(created.id).await);
        assert!(store.create(&name, &hash()).await.is_ok());
    }
}
