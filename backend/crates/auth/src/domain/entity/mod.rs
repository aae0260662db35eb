//! Entity Module

pub mod auth_context;
pub mod claims;
pub mod identity;
