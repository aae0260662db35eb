//! User Password Value Object
//!
//! Domain wrappers around `platform::password`.
//!
//! - [`RawPassword`]: user input, zeroized on drop, never logged
//! - [`UserPassword`]: Argon2id PHC string, safe to store

use platform::password::{
    ClearTextPassword, HashCost, HashedPassword, PasswordHashError, PasswordPolicy,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is automatically zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Wrap input without any policy check (login path)
    pub fn new(raw: String) -> Self {
        Self(ClearTextPassword::new(raw))
    }

    /// Wrap input that must satisfy the composition policy (registration path)
    ///
    /// All violated rules are reported together.
    pub fn validated(raw: String, policy: &PasswordPolicy) -> AuthResult<Self> {
        let password = Self::new(raw);
        let violations = policy.validate(password.0.as_str());
        if violations.is_empty() {
            Ok(password)
        } else {
            Err(AuthError::PasswordPolicy(violations.into_iter().collect()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password. Blocking; see `CredentialHasher`.
    pub fn hash(raw: &RawPassword, cost: &HashCost) -> Result<Self, PasswordHashError> {
        raw.inner().hash(cost).map(Self)
    }

    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(s).map(Self)
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password. Blocking; see `CredentialHasher`.
    pub fn verify(&self, raw: &RawPassword) -> bool {
        self.0.verify(raw.inner())
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
