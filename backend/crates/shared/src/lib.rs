//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest shared vocabulary of the backend:
//! - The unified error type ([`error::app_error::AppError`]) and its kinds
//! - Typed integer identifiers ([`id::Id`])
//!
//! Only things with the same meaning in every crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
