//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (Base64url, secure randomness, constant-time compare)
//! - JWE compact serialization (dir + A256GCM)
//! - Password policy and hashing (Argon2id with a configurable work factor)
//! - Cookie and bearer-token header handling

pub mod cookie;
pub mod crypto;
pub mod jose;
pub mod password;
