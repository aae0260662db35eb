//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, credential store trait
//! - `application/` - Use cases, token issuer/verifier, authorization gate
//! - `infra/` - PostgreSQL and in-memory credential stores
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Registration with a composition policy on passwords
//! - Login with a stateless session token in an `auth_token` cookie
//!   (or `Authorization: Bearer`)
//! - Two gate stages: authenticated, then privileged ("worm")
//!
//! ## Security Model
//! - Passwords hashed with Argon2id off the async executor
//! - Session token is a JWS (HS256) inside a JWE (dir, A256GCM)
//! - Unknown user and wrong password are indistinguishable to the caller
//! - The privileged flag is trusted as issued until the token expires

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError, RuntimeEnv, TokenKeys};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryCredentialStore, postgres::PgCredentialStore};
pub use presentation::handlers::AuthAppState;
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
