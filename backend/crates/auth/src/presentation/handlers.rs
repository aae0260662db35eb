//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use std::sync::Arc;

use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::config::{AuthConfig, ConfigError, TokenKeys};
use crate::application::{
    AuthGate, CredentialHasher, IntrospectUseCase, ListWormsUseCase, LoginInput, LoginUseCase,
    RegisterInput, RegisterUseCase, TokenIssuer, TokenVerifier,
};
use crate::domain::repository::CredentialStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CredentialsRequest, IdentityResponse, LogoutResponse, MeResponse, UserView,
    WormCheckResponse, WormView, WormsResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<S>
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub config: Arc<AuthConfig>,
    pub hasher: Arc<CredentialHasher>,
    pub issuer: Arc<TokenIssuer>,
    pub gate: Arc<AuthGate>,
}

impl<S> AuthAppState<S>
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    /// Wire the store, config and keys together
    pub fn new(store: S, config: AuthConfig, keys: TokenKeys) -> Result<Self, ConfigError> {
        config.validate()?;

        let keys = Arc::new(keys);
        let issuer = TokenIssuer::new(keys.clone(), config.session_ttl)?;
        let verifier = Arc::new(TokenVerifier::new(keys));
        let gate = AuthGate::new(verifier, config.session_cookie_name.clone());
        let hasher = CredentialHasher::new(config.hash_cost, config.hash_workers);

        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            hasher: Arc::new(hasher),
            issuer: Arc::new(issuer),
            gate: Arc::new(gate),
        })
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/register
pub async fn register<S>(
    State(state): State<AuthAppState<S>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<IdentityResponse>)>
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Register body rejected");
        AuthError::MalformedBody
    })?;
    let use_case = RegisterUseCase::new(state.store.clone(), state.hasher.clone());

    let output = use_case
        .execute(RegisterInput {
            user_name: req.user_name,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IdentityResponse {
            id: output.id,
            user_name: output.user_name.into_inner(),
        }),
    ))
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /api/login
///
/// An unreadable body is just another credential failure.
pub async fn login<S>(
    State(state): State<AuthAppState<S>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Login body rejected");
        AuthError::InvalidCredentials
    })?;
    let use_case = LoginUseCase::new(
        state.store.clone(),
        state.hasher.clone(),
        state.issuer.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            user_name: req.user_name,
            password: req.password,
        })
        .await?;

    let cookie = set_cookie_header(&state.config.cookie_config(), &output.token)
        .ok_or_else(|| AuthError::Internal("Login failed".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(IdentityResponse {
            id: output.id,
            user_name: output.user_name.into_inner(),
        }),
    ))
}

/// POST /api/logout
///
/// Always succeeds; there is no server-side session to end.
pub async fn logout<S>(State(state): State<AuthAppState<S>>) -> impl IntoResponse
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    let cookie = delete_cookie_header(&state.config.cookie_config());

    (
        StatusCode::OK,
        AppendHeaders(cookie.map(|value| (header::SET_COOKIE, value))),
        Json(LogoutResponse { ok: true }),
    )
}

// ============================================================================
// Current user (requires authentication)
// ============================================================================

/// GET /api/me
pub async fn me<S>(
    State(state): State<AuthAppState<S>>,
    CurrentUser(context): CurrentUser,
) -> AuthResult<Json<MeResponse>>
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    let identity = IntrospectUseCase::new(state.store.clone())
        .execute(&context)
        .await?;

    Ok(Json(MeResponse {
        user: UserView::from(&identity),
    }))
}

// ============================================================================
// Worms
// ============================================================================

/// GET /api/worms
pub async fn list_worms<S>(State(state): State<AuthAppState<S>>) -> AuthResult<Json<WormsResponse>>
where
    S: CredentialStore + Clone + Send + Sync + 'static,
{
    let worms = ListWormsUseCase::new(state.store.clone()).execute().await?;

    Ok(Json(WormsResponse {
        worms: worms.iter().map(WormView::from).collect(),
    }))
}

/// GET /api/worm/check (requires privilege)
pub async fn worm_check(CurrentUser(context): CurrentUser) -> Json<WormCheckResponse> {
    Json(WormCheckResponse {
        ok: true,
        user_name: context.user_name,
    })
}
