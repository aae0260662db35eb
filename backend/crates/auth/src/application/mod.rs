//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod gate;
pub mod hasher;
pub mod introspect;
pub mod list_worms;
pub mod login;
pub mod register;
pub mod token;

// Re-exports
pub use config::{AuthConfig, ConfigError, RuntimeEnv, TokenKeys};
pub use gate::{AuthGate, Clearance};
pub use hasher::CredentialHasher;
pub use introspect::IntrospectUseCase;
pub use list_worms::ListWormsUseCase;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use token::{TokenError, TokenIssuer, TokenVerifier};
