//! Session Tokens
//!
//! Sign-then-encrypt: the claims are signed as a compact JWS (HS256) with
//! `jsonwebtoken`, and the JWS is encrypted as a compact JWE (`dir`,
//! A256GCM).
//!
//! ```text
//! b64u({"alg":"dir","enc":"A256GCM"}) . "" . b64u(iv) . b64u(ct) . b64u(tag)
//!                                                        └─ header.claims.mac (HS256)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use platform::jose::{self, JoseError};
use thiserror::Error;

use crate::application::config::{ConfigError, MAX_SESSION_TTL, TokenKeys};
use crate::domain::entity::{claims::Claims, identity::Identity};

/// Why a token was refused or could not be built
///
/// Only ever logged; callers see a single "invalid or expired" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("envelope rejected: {0}")]
    Envelope(JoseError),

    /// Bad MAC, unexpected algorithm, or an unreadable JWS
    #[error("signature rejected")]
    Signature,

    /// Claims not encodable to whole seconds, or not decodable
    #[error("claims could not be encoded or decoded exactly")]
    MalformedClaims,

    #[error("claims issued at or after expiry")]
    InvalidLifetime,

    #[error("token expired")]
    Expired,

    #[error("token could not be sealed: {0}")]
    Seal(JoseError),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::Json(_) | JwtErrorKind::MissingRequiredClaim(_) => {
                TokenError::MalformedClaims
            }
            _ => TokenError::Signature,
        }
    }
}

// ============================================================================
// Issuer
// ============================================================================

/// Builds session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<TokenKeys>,
    encoding_key: EncodingKey,
    ttl: TimeDelta,
}

impl TokenIssuer {
    /// `ttl` must be positive and no longer than [`MAX_SESSION_TTL`]
    pub fn new(keys: Arc<TokenKeys>, ttl: Duration) -> Result<Self, ConfigError> {
        let ttl = Some(ttl)
            .filter(|ttl| !ttl.is_zero() && *ttl <= MAX_SESSION_TTL)
            .and_then(|ttl| TimeDelta::from_std(ttl).ok())
            .ok_or_else(|| ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS",
                reason: format!(
                    "must be between 1 and {} seconds",
                    MAX_SESSION_TTL.as_secs()
                ),
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(keys.sign_secret()),
            keys,
            ttl,
        })
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Claims for a login at `now`
    pub fn claims_for(&self, identity: &Identity, now: DateTime<Utc>) -> Claims {
        Claims::for_identity(identity, now, self.ttl)
    }

    /// Sign, then encrypt
    ///
    /// Timestamps travel as whole seconds; claims carrying sub-second parts
    /// are refused rather than silently truncated.
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        if !claims.has_whole_second_timestamps() {
            return Err(TokenError::MalformedClaims);
        }

        let jws = jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| TokenError::MalformedClaims)?;
        jose::encrypt_dir_a256gcm(self.keys.enc_key(), jws.as_bytes()).map_err(TokenError::Seal)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &self.keys)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Verifier
// ============================================================================

/// Opens and checks session tokens
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<TokenKeys>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<TokenKeys>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(keys.sign_secret()),
            keys,
            validation,
        }
    }

    /// Check a token against the wall clock
    ///
    /// `exp` is enforced by `jsonwebtoken` with no leeway, then once more
    /// against `now` so that a token is dead from its `exp` second on.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.open(token, &self.validation, Utc::now())
    }

    /// Check a token against an explicit `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;
        self.open(token, &validation, now)
    }

    /// Decrypt, check the signature, then the lifetime
    ///
    /// Every stage is terminal; nothing is recovered from a partially
    /// valid token.
    fn open(
        &self,
        token: &str,
        validation: &Validation,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let jws_bytes =
            jose::decrypt_dir_a256gcm(self.keys.enc_key(), token).map_err(TokenError::Envelope)?;
        let jws = std::str::from_utf8(&jws_bytes).map_err(|_| TokenError::Signature)?;

        let claims = jsonwebtoken::decode::<Claims>(jws, &self.decoding_key, validation)?.claims;

        if !claims.has_valid_lifetime() {
            return Err(TokenError::InvalidLifetime);
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys)
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
