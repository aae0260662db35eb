//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use sqlx::PgPool;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// SQLSTATE `unique_violation`
const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgCredentialStore {
    async fn find_by_name(&self, user_name: &UserName) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT
                id,
                user_name,
                password_hash,
                privileged,
                created_at
            FROM identities
            WHERE user_name = $1
            "#,
        )
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT
                id,
                user_name,
                password_hash,
                privileged,
                created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<Identity> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO identities (
                user_name,
                password_hash,
                privileged
            ) VALUES ($1, $2, FALSE)
            RETURNING
                id,
                user_name,
                password_hash,
                privileged,
                created_at
            "#,
        )
        .bind(user_name.as_str())
        .bind(password_hash.as_phc_string())
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        row.into_identity()
    }

    async fn list_privileged(&self) -> AuthResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT
                id,
                user_name,
                password_hash,
                privileged,
                created_at
            FROM identities
            WHERE privileged = TRUE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_identity()).collect()
    }
}

/// Unique violation on `user_name` means the name is taken
fn map_insert_error(err: sqlx::Error) -> AuthError {
    let unique_violation = matches!(
        &err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION)
    );
    if unique_violation {
        AuthError::UserNameTaken
    } else {
        AuthError::Database(err)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    user_name: String,
    password_hash: String,
    privileged: bool,
    created_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> AuthResult<Identity> {
        let password_hash = UserPassword::from_phc_string(self.password_hash).map_err(|e| {
            AuthError::Internal(format!("Stored hash for identity {} is unreadable: {e}", self.id))
        })?;

        Ok(Identity {
            id: IdentityId::new(self.id),
            user_name: UserName::from_db(self.user_name),
            password_hash,
            privileged: self.privileged,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        assert!(matches!(
            map_insert_error(sqlx::Error::RowNotFound),
            AuthError::Database(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            map_insert_error(sqlx::Error::PoolTimedOut),
            AuthError::Database(_)
        ));
    }
}
