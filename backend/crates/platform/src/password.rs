//! Password Policy, Hashing and Verification
//!
//! - Composition policy (length, uppercase, digits, symbols), reporting every
//!   violated rule at once
//! - Argon2id hashing with a configurable work factor (PHC string output)
//! - Zeroization of clear text on drop
//!
//! ## Security Features
//! - Memory-hard hashing prevents GPU/ASIC attacks
//! - Random 128-bit salt per hash
//! - Verification compares in constant time (inside `argon2`)
//! - Unicode NFKC normalization so visually equal input hashes equally

use std::collections::BTreeSet;
use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Policy
// ============================================================================

/// A single violated composition rule
///
/// Ordered so that a set of violations always lists in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordViolation {
    TooShort,
    TooFewUppercase,
    TooFewDigits,
    TooFewSymbols,
}

impl PasswordViolation {
    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            PasswordViolation::TooShort => "too_short",
            PasswordViolation::TooFewUppercase => "too_few_uppercase",
            PasswordViolation::TooFewDigits => "too_few_digits",
            PasswordViolation::TooFewSymbols => "too_few_symbols",
        }
    }
}

/// Composition rules for new passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub min_uppercase: usize,
    pub min_digits: usize,
    pub min_symbols: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 16,
            min_uppercase: 3,
            min_digits: 3,
            min_symbols: 3,
        }
    }
}

impl PasswordPolicy {
    /// Check every rule independently and return all violations
    ///
    /// Length counts Unicode scalar values. The classes are ASCII: uppercase
    /// is `A-Z`, digits are `0-9`, and a symbol is anything outside
    /// `A-Za-z0-9` (so `é`, `Ä` and whitespace all count as symbols).
    pub fn validate(&self, password: &str) -> BTreeSet<PasswordViolation> {
        let mut length = 0;
        let mut uppercase = 0;
        let mut digits = 0;
        let mut symbols = 0;

        for ch in password.chars() {
            length += 1;
            if ch.is_ascii_uppercase() {
                uppercase += 1;
            } else if ch.is_ascii_digit() {
                digits += 1;
            } else if !ch.is_ascii_alphanumeric() {
                symbols += 1;
            }
        }

        let mut violations = BTreeSet::new();
        if length < self.min_length {
            violations.insert(PasswordViolation::TooShort);
        }
        if uppercase < self.min_uppercase {
            violations.insert(PasswordViolation::TooFewUppercase);
        }
        if digits < self.min_digits {
            violations.insert(PasswordViolation::TooFewDigits);
        }
        if symbols < self.min_symbols {
            violations.insert(PasswordViolation::TooFewSymbols);
        }
        violations
    }

    /// Human-readable requirement text for a violation under this policy
    pub fn describe(&self, violation: PasswordViolation) -> String {
        match violation {
            PasswordViolation::TooShort => format!("at least {} characters", self.min_length),
            PasswordViolation::TooFewUppercase => {
                format!("at least {} uppercase letters", self.min_uppercase)
            }
            PasswordViolation::TooFewDigits => format!("at least {} numbers", self.min_digits),
            PasswordViolation::TooFewSymbols => format!("at least {} symbols", self.min_symbols),
        }
    }
}

// ============================================================================
// Work factor
// ============================================================================

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB
    pub memory_kib: u32,
    /// Passes over memory
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for HashCost {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashCost {
    /// The cheapest parameters argon2 accepts. Tests only.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidCost(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Check the parameters without hashing anything
    pub fn validate(&self) -> Result<(), PasswordHashError> {
        self.hasher().map(|_| ())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Work factor rejected by argon2
    #[error("Invalid hash cost: {0}")]
    InvalidCost(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap user input, NFKC-normalized
    pub fn new(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password using Argon2id with the given cost
    ///
    /// CPU- and memory-heavy; run it off the async executor.
    pub fn hash(&self, cost: &HashCost) -> Result<HashedPassword, PasswordHashError> {
        // Generate random salt (128 bits = 16 bytes)
        let salt = SaltString::generate(OsRng);

        let hash = cost
            .hasher()?
            .hash_password(self.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string carries algorithm, version, cost parameters and salt, so
/// hashes made under an older [`HashCost`] keep verifying.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// Parameters are read from the PHC string, not from the current config.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(p: &str) -> Vec<PasswordViolation> {
        PasswordPolicy::default().validate(p).into_iter().collect()
    }

    #[test]
    fn test_policy_reports_every_violation() {
        assert_eq!(
            violations("short"),
            vec![
                PasswordViolation::TooShort,
                PasswordViolation::TooFewUppercase,
                PasswordViolation::TooFewDigits,
                PasswordViolation::TooFewSymbols,
            ]
        );
    }

    #[test]
    fn test_policy_accepts_compliant_password() {
        assert!(violations("Tr0ub4dor&3ZQ!#x").is_empty());
    }

    #[test]
    fn test_policy_fourteen_chars_two_symbols() {
        assert_eq!(
            violations("Tr0ub4dor&3ZQ!"),
            vec![PasswordViolation::TooShort, PasswordViolation::TooFewSymbols]
        );
    }

    #[test]
    fn test_policy_length_counts_chars_not_bytes() {
        // 16 chars, more bytes
        let p = "ABC123!!!ééééééé";
        assert_eq!(p.chars().count(), 16);
        assert!(p.len() > 16);
        assert!(violations(p).is_empty());
    }

    #[test]
    fn test_policy_classes_are_ascii() {
        // Non-ASCII capitals and Arabic-Indic digits only count as symbols
        assert_eq!(
            violations("ÄÖÜ١٢٣abcdefg!@#"),
            vec![
                PasswordViolation::TooFewUppercase,
                PasswordViolation::TooFewDigits,
            ]
        );
        // Accented lowercase letters satisfy the symbol rule
        assert!(violations("ABC123xyzéèêabcd").is_empty());
    }

    #[test]
    fn test_policy_long_lowercase_only() {
        assert_eq!(
            violations("abcdefghijklmnopqrstuvwxyz"),
            vec![
                PasswordViolation::TooFewUppercase,
                PasswordViolation::TooFewDigits,
                PasswordViolation::TooFewSymbols,
            ]
        );
    }

    #[test]
    fn test_policy_empty() {
        assert_eq!(violations("").len(), 4);
    }

    #[test]
    fn test_violation_codes_and_descriptions() {
        let policy = PasswordPolicy::default();
        assert_eq!(PasswordViolation::TooShort.code(), "too_short");
        assert_eq!(
            serde_json::to_string(&PasswordViolation::TooFewSymbols).unwrap(),
            "\"too_few_symbols\""
        );
        assert_eq!(
            policy.describe(PasswordViolation::TooShort),
            "at least 16 characters"
        );
        assert_eq!(
            policy.describe(PasswordViolation::TooFewDigits),
            "at least 3 numbers"
        );
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let hashed = password.hash(&HashCost::minimal()).unwrap();

        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        assert!(hashed.verify(&password));

        let wrong_password = ClearTextPassword::new("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong_password));
    }

    #[test]
    fn test_same_password_different_salt() {
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let a = password.hash(&HashCost::minimal()).unwrap();
        let b = password.hash(&HashCost::minimal()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cost_is_recorded_in_hash() {
        let cost = HashCost {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        };
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let hashed = password.hash(&cost).unwrap();
        assert!(hashed.as_phc_string().contains("m=16,t=2,p=1"));
        assert!(hashed.verify(&password));
    }

    #[test]
    fn test_invalid_cost() {
        let cost = HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            cost.validate(),
            Err(PasswordHashError::InvalidCost(_))
        ));
        assert!(HashCost::default().validate().is_ok());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth "Ａ" normalizes to ASCII "A"
        let fullwidth = ClearTextPassword::new("Ａbc".to_string());
        assert_eq!(fullwidth.as_str(), "Abc");
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let hashed = password.hash(&HashCost::minimal()).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password));
    }

    #[test]
    fn test_invalid_phc_string() {
        let result = HashedPassword::from_phc_string("not_a_valid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
