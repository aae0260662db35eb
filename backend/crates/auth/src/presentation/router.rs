//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::gate::AuthGate;
use crate::domain::repository::CredentialStore;
use crate::infra::postgres::PgCredentialStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_authenticated, require_privileged};

/// Create the Auth router with PostgreSQL store
pub fn auth_router(state: AuthAppState<PgCredentialStore>) -> Router {
    auth_router_generic(state)
}

/// Create a generic Auth router for any store implementation
///
/// Routes are relative; nest under `/api`.
pub fn auth_router_generic<S>(state: AuthAppState<S>) -> Router
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    let authenticated = Router::new()
        .route("/me", get(handlers::me::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_authenticated,
        ));

    let worm_only = privileged(
        Router::new().route("/worm/check", get(handlers::worm_check)),
        state.gate.clone(),
    );

    Router::new()
        .route("/register", post(handlers::register::<S>))
        .route("/login", post(handlers::login::<S>))
        .route("/logout", post(handlers::logout::<S>))
        .route("/worms", get(handlers::list_worms::<S>))
        .merge(authenticated)
        .merge(worm_only)
        .with_state(state)
}

/// Put routes behind authentication and the privileged flag
///
/// The last layer added runs first: authenticate, then check privilege.
pub fn privileged<T>(router: Router<T>, gate: Arc<AuthGate>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router
        .route_layer(middleware::from_fn(require_privileged))
        .route_layer(middleware::from_fn_with_state(gate, require_authenticated))
}
