//! Auth Middleware
//!
//! Adapts the gate stages to axum. `require_authenticated` puts the
//! verified [`AuthContext`] into the request extensions; later stages and
//! handlers read it from there.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use platform::cookie::extract_session_token;

use crate::application::gate::{self, AuthGate};
use crate::domain::entity::auth_context::AuthContext;
use crate::error::AuthError;

/// Middleware that requires a valid session token (cookie or bearer)
pub async fn require_authenticated(
    State(gate): State<Arc<AuthGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_session_token(req.headers(), gate.cookie_name());
    let context = gate.authenticate(token.as_deref())?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Middleware that requires the privileged flag
///
/// Must be layered inside `require_authenticated`.
pub async fn require_privileged(req: Request, next: Next) -> Result<Response, AuthError> {
    gate::require_privileged(req.extensions().get::<AuthContext>())?;
    Ok(next.run(req).await)
}

/// Extractor for the authenticated caller
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::NotAuthenticated)
    }
}
