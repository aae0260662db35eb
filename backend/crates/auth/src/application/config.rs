//! Application Configuration
//!
//! Configuration for the Auth application layer, and the session token keys.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::crypto;
use platform::jose::{DIRECT_KEY_LEN, DirectKey};
use platform::password::HashCost;
use thiserror::Error;
use zeroize::Zeroizing;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Longest accepted session lifetime
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Minimum signing secret length accepted in production (bytes)
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

// ============================================================================
// Errors
// ============================================================================

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SIGN_SECRET must be set")]
    MissingSignSecret,

    #[error("JWT_SIGN_SECRET must be at least {min} bytes in production (got {actual})")]
    WeakSignSecret { min: usize, actual: usize },

    #[error("JWT_ENC_KEY is invalid: {0}")]
    InvalidEncKey(String),

    #[error("JWT_ENC_KEY must be set in production")]
    FallbackKeyRefused,

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

// ============================================================================
// Runtime environment
// ============================================================================

/// Deployment environment, from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeEnv {
    #[default]
    Development,
    Production,
}

impl RuntimeEnv {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnv::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeEnv::Development => "development",
            RuntimeEnv::Production => "production",
        }
    }
}

impl FromStr for RuntimeEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(RuntimeEnv::Development),
            "prod" | "production" => Ok(RuntimeEnv::Production),
            other => Err(ConfigError::InvalidValue {
                name: "APP_ENV",
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Auth configuration
// ============================================================================

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub runtime_env: RuntimeEnv,
    /// Session cookie name
    pub session_cookie_name: String,
    /// Token lifetime, also the cookie Max-Age
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Argon2id work factor for new hashes
    pub hash_cost: HashCost,
    /// Concurrent hash/verify operations on the blocking pool
    pub hash_workers: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            runtime_env: RuntimeEnv::Production,
            session_cookie_name: SESSION_COOKIE_NAME.to_string(),
            session_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            hash_cost: HashCost::default(),
            hash_workers: default_hash_workers(),
        }
    }
}

impl AuthConfig {
    /// Defaults for the given environment; Secure cookies only in production
    pub fn for_env(runtime_env: RuntimeEnv) -> Self {
        Self {
            runtime_env,
            cookie_secure: runtime_env.is_production(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self::for_env(RuntimeEnv::Development)
    }

    /// Session TTL in whole seconds
    pub fn session_ttl_secs(&self) -> i64 {
        i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Cookie settings for the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl_secs()),
        }
    }

    /// Reject values the rest of the crate cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl.is_zero() || self.session_ttl > MAX_SESSION_TTL {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS",
                reason: format!(
                    "must be between 1 and {} seconds",
                    MAX_SESSION_TTL.as_secs()
                ),
            });
        }
        if self.hash_workers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PASSWORD_HASH_WORKERS",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.hash_cost
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                name: "PASSWORD_HASH_*",
                reason: e.to_string(),
            })
    }
}

fn default_hash_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

// ============================================================================
// Token keys
// ============================================================================

/// Key material for session tokens, loaded once at startup
#[derive(Clone)]
pub struct TokenKeys {
    sign_secret: Zeroizing<Vec<u8>>,
    enc_key: DirectKey,
}

impl TokenKeys {
    pub fn new(sign_secret: Vec<u8>, enc_key: DirectKey) -> Self {
        Self {
            sign_secret: Zeroizing::new(sign_secret),
            enc_key,
        }
    }

    /// Fresh random keys (for development and tests)
    pub fn random() -> Self {
        let mut key = [0u8; DIRECT_KEY_LEN];
        key.copy_from_slice(&crypto::random_bytes(DIRECT_KEY_LEN));
        Self::new(crypto::random_bytes(32), DirectKey::new(key))
    }

    /// Build keys from `JWT_SIGN_SECRET` and `JWT_ENC_KEY` values
    ///
    /// Without an encryption key, the signing secret truncated or zero-padded
    /// to 32 bytes is used instead. That fallback is refused in production.
    pub fn load(
        runtime_env: RuntimeEnv,
        sign_secret: Option<&str>,
        enc_key_b64: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let sign_secret = sign_secret
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSignSecret)?
            .as_bytes()
            .to_vec();

        if runtime_env.is_production() && sign_secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ConfigError::WeakSignSecret {
                min: MIN_PRODUCTION_SECRET_LEN,
                actual: sign_secret.len(),
            });
        }

        let enc_key = match enc_key_b64.map(str::trim).filter(|s| !s.is_empty()) {
            Some(encoded) => {
                let raw = Zeroizing::new(
                    crypto::from_base64(encoded)
                        .map_err(|e| ConfigError::InvalidEncKey(e.to_string()))?,
                );
                DirectKey::from_slice(&raw).ok_or_else(|| {
                    ConfigError::InvalidEncKey(format!(
                        "expected {DIRECT_KEY_LEN} bytes, got {}",
                        raw.len()
                    ))
                })?
            }
            None if runtime_env.is_production() => return Err(ConfigError::FallbackKeyRefused),
            None => {
                tracing::warn!(
                    "JWT_ENC_KEY not set; deriving the encryption key from JWT_SIGN_SECRET (development only)"
                );
                DirectKey::truncate_or_pad(&sign_secret)
            }
        };

        Ok(Self::new(sign_secret, enc_key))
    }

    pub fn sign_secret(&self) -> &[u8] {
        &self.sign_secret
    }

    pub fn enc_key(&self) -> &DirectKey {
        &self.enc_key
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("sign_secret", &"[REDACTED]")
            .field("enc_key", &self.enc_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_B64: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";
    const LONG_SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_runtime_env_parse() {
        assert_eq!("production".parse::<RuntimeEnv>().unwrap(), RuntimeEnv::Production);
        assert_eq!("".parse::<RuntimeEnv>().unwrap(), RuntimeEnv::Development);
        assert!("staging".parse::<RuntimeEnv>().is_err());
    }

    #[test]
    fn test_cookie_secure_follows_env() {
        assert!(!AuthConfig::development().cookie_config().secure);
        let prod = AuthConfig::for_env(RuntimeEnv::Production).cookie_config();
        assert!(prod.secure);
        assert_eq!(prod.name, "auth_token");
        assert_eq!(prod.max_age_secs, Some(604_800));
    }

    #[test]
    fn test_validate() {
        assert!(AuthConfig::development().validate().is_ok());
        let config = AuthConfig {
            session_ttl: Duration::ZERO,
            ..AuthConfig::development()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name: "SESSION_TTL_SECS", .. })
        ));
    }

    #[test]
    fn test_validate_ttl_upper_bound() {
        let at_limit = AuthConfig {
            session_ttl: MAX_SESSION_TTL,
            ..AuthConfig::development()
        };
        assert!(at_limit.validate().is_ok());

        let overflowing = AuthConfig {
            session_ttl: Duration::from_secs(10_000_000_000_000),
            ..AuthConfig::development()
        };
        assert!(matches!(
            overflowing.validate(),
            Err(ConfigError::InvalidValue { name: "SESSION_TTL_SECS", .. })
        ));
    }

    #[test]
    fn test_load_with_enc_key() {
        let keys = TokenKeys::load(RuntimeEnv::Production, Some(LONG_SECRET), Some(KEY_B64))
            .unwrap();
        assert_eq!(keys.sign_secret(), LONG_SECRET.as_bytes());
        let expected: Vec<u8> = (0u8..32).collect();
        assert_eq!(
            keys.enc_key(),
            &DirectKey::from_slice(&expected).unwrap()
        );
    }

    #[test]
    fn test_missing_sign_secret() {
        assert!(matches!(
            TokenKeys::load(RuntimeEnv::Development, None, Some(KEY_B64)),
            Err(ConfigError::MissingSignSecret)
        ));
        assert!(matches!(
            TokenKeys::load(RuntimeEnv::Development, Some(""), Some(KEY_B64)),
            Err(ConfigError::MissingSignSecret)
        ));
    }

    #[test]
    fn test_fallback_key_in_development() {
        let keys = TokenKeys::load(RuntimeEnv::Development, Some("short-secret"), None).unwrap();
        assert_eq!(
            keys.enc_key(),
            &DirectKey::truncate_or_pad(b"short-secret")
        );
    }

    #[test]
    fn test_fallback_key_refused_in_production() {
        assert!(matches!(
            TokenKeys::load(RuntimeEnv::Production, Some(LONG_SECRET), None),
            Err(ConfigError::FallbackKeyRefused)
        ));
    }

    #[test]
    fn test_weak_secret_refused_in_production() {
        assert!(matches!(
            TokenKeys::load(RuntimeEnv::Production, Some("short"), Some(KEY_B64)),
            Err(ConfigError::WeakSignSecret { min: 32, actual: 5 })
        ));
    }

    #[test]
    fn test_invalid_enc_key() {
        assert!(matches!(
            TokenKeys::load(RuntimeEnv::Development, Some("secret"), Some("not base64!")),
            Err(ConfigError::InvalidEncKey(_))
        ));
        // 16 bytes
        assert!(matches!(
            TokenKeys::load(
                RuntimeEnv::Development,
                Some("secret"),
                Some("AAECAwQFBgcICQoLDA0ODw==")
            ),
            Err(ConfigError::InvalidEncKey(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let keys = TokenKeys::load(RuntimeEnv::Development, Some("hunter2-secret"), None).unwrap();
        assert!(!format!("{keys:?}").contains("hunter2"));
    }
}
