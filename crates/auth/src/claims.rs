use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coreflow_core::TenantId;

use crate::{PrincipalId, Role};

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the platform expects once a token has
/// been decoded and its signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Tenant context for the token.
    pub tenant_id: TenantId,

    /// RBAC roles granted within the tenant context.
    pub roles: Vec<Role>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    /// Claims valid from `now` for the given time-to-live.
    pub fn new(sub: PrincipalId, tenant_id: TenantId, roles: Vec<Role>, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            sub,
            tenant_id,
            roles,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(ttl_minutes: i64) -> JwtClaims {
        JwtClaims::new(
            PrincipalId::new(),
            TenantId::new(),
            vec![Role::new("admin")],
            Duration::minutes(ttl_minutes),
        )
    }

    #[test]
    fn fresh_claims_validate() {
        let c = claims(30);
        assert_eq!(validate_claims(&c, Utc::now()), Ok(()));
    }

    #[test]
    fn expired_claims_are_rejected() {
        let c = claims(30);
        let later = c.expires_at + Duration::seconds(1);
        assert_eq!(validate_claims(&c, later), Err(TokenValidationError::Expired));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let c = claims(30);
        assert_eq!(
            validate_claims(&c, c.expires_at),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_issued_at_is_rejected() {
        let mut c = claims(30);
        let now = Utc::now();
        c.issued_at = now + Duration::minutes(5);
        c.expires_at = now + Duration::minutes(35);
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_beats_other_checks() {
        let mut c = claims(30);
        c.expires_at = c.issued_at - Duration::minutes(1);
        // Window sanity is checked before the clock comparisons.
        assert_eq!(
            validate_claims(&c, Utc::now()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
