//! Session Claims
//!
//! The snapshot of an identity embedded in a session token at login.
//! Timestamps have whole-second precision (JWT NumericDate), so a decoded
//! token compares equal to the claims it was issued from.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use kernel::id::IdentityId;
use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::Identity;

/// Claims carried inside a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject_id: IdentityId,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "worm")]
    pub privileged: bool,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Snapshot an identity at `now`, valid for `ttl`
    ///
    /// An expiry past the representable range saturates.
    pub fn for_identity(identity: &Identity, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .map(|at| at.trunc_subsecs(0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC.trunc_subsecs(0));
        Self {
            subject_id: identity.id,
            user_name: identity.user_name.as_str().to_string(),
            privileged: identity.privileged,
            issued_at,
            expires_at,
        }
    }

    /// Both timestamps survive the NumericDate encoding unchanged
    pub fn has_whole_second_timestamps(&self) -> bool {
        self.issued_at.timestamp_subsec_nanos() == 0
            && self.expires_at.timestamp_subsec_nanos() == 0
    }

    /// `issued_at < expires_at`
    pub fn has_valid_lifetime(&self) -> bool {
        self.issued_at < self.expires_at
    }

    /// Expired at or after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };
    use chrono::TimeZone;
    use platform::password::HashCost;

    fn identity() -> Identity {
        Identity {
            id: IdentityId::new(42),
            user_name: UserName::new("worm").unwrap(),
            password_hash: UserPassword::hash(
                &RawPassword::new("unused".to_string()),
                &HashCost::minimal(),
            )
            .unwrap(),
            privileged: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_for_identity_truncates_to_seconds() {
        let now = Utc.timestamp_opt(1_700_000_000, 987_654_321).unwrap();
        let claims = Claims::for_identity(&identity(), now, TimeDelta::days(7));

        assert_eq!(claims.issued_at.timestamp(), 1_700_000_000);
        assert_eq!(claims.issued_at.timestamp_subsec_nanos(), 0);
        assert_eq!(claims.expires_at - claims.issued_at, TimeDelta::days(7));
        assert!(claims.has_valid_lifetime());
        assert_eq!(claims.subject_id, IdentityId::new(42));
        assert!(claims.privileged);
    }

    #[test]
    fn test_wire_names() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_identity(&identity(), now, TimeDelta::seconds(60));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "sub": 42,
                "userName": "worm",
                "worm": true,
                "iat": 1_700_000_000,
                "exp": 1_700_000_060,
            })
        );
        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_identity(&identity(), now, TimeDelta::MAX);
        assert!(claims.has_valid_lifetime());
        assert!(claims.has_whole_second_timestamps());
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_whole_second_timestamps() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut claims = Claims::for_identity(&identity(), now, TimeDelta::seconds(10));
        assert!(claims.has_whole_second_timestamps());

        claims.issued_at = Utc.timestamp_opt(1_700_000_000, 1).unwrap();
        assert!(!claims.has_whole_second_timestamps());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_identity(&identity(), now, TimeDelta::seconds(10));
        assert!(!claims.is_expired_at(now + TimeDelta::seconds(9)));
        assert!(claims.is_expired_at(now + TimeDelta::seconds(10)));
    }
}
