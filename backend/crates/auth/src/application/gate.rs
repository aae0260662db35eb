//! Authorization Gate
//!
//! Ordered stages over explicit inputs:
//!
//! ```text
//! Unauthenticated --require_authenticated--> Authenticated --require_privileged--> Privileged
//!        \                                         \
//!         `--> Rejected(NotAuthenticated |          `--> Rejected(NotAuthenticated |
//!                       SessionInvalid)                           InsufficientPrivilege)
//! ```
//!
//! The stages are plain functions; the axum middleware only adapts them.

use std::sync::Arc;

use crate::application::token::TokenVerifier;
use crate::domain::entity::auth_context::AuthContext;
use crate::error::{AuthError, AuthResult};

/// How far a request must get through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    Authenticated,
    Privileged,
}

/// Stage 1: a present, valid token
pub fn require_authenticated(
    token: Option<&str>,
    verifier: &TokenVerifier,
) -> AuthResult<AuthContext> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::NotAuthenticated)?;
    let claims = verifier.verify(token)?;
    Ok(AuthContext::from(claims))
}

/// Stage 2: an authenticated context with the privileged flag
pub fn require_privileged(context: Option<&AuthContext>) -> AuthResult<&AuthContext> {
    let context = context.ok_or(AuthError::NotAuthenticated)?;
    if context.privileged {
        Ok(context)
    } else {
        Err(AuthError::InsufficientPrivilege)
    }
}

/// Session gate shared by the middleware
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
    cookie_name: String,
}

impl AuthGate {
    pub fn new(verifier: Arc<TokenVerifier>, cookie_name: impl Into<String>) -> Self {
        Self {
            verifier,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn authenticate(&self, token: Option<&str>) -> AuthResult<AuthContext> {
        require_authenticated(token, &self.verifier)
    }

    /// Run the stages in order up to `clearance`
    pub fn admit(&self, token: Option<&str>, clearance: Clearance) -> AuthResult<AuthContext> {
        let context = self.authenticate(token)?;
        if clearance == Clearance::Privileged {
            require_privileged(Some(&context))?;
        }
        Ok(context)
    }
}
