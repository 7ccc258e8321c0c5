use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum JwtError {
    /// Signature verification or deserialization failed.
    #[error("token rejected: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    /// The token decoded fine but its claims are not currently valid.
    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and returns its claims.
///
/// Implementations must be cheap to call per request; key material is loaded
/// once at construction.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 validator over a shared secret.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Claims carry RFC 3339 timestamps instead of numeric `exp`/`iat`,
        // so the library only checks the signature; the time window is
        // enforced by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<JwtClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrincipalId, Role};
    use chrono::Duration;
    use coreflow_core::TenantId;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(claims: &JwtClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_claims() -> JwtClaims {
        JwtClaims::new(
            PrincipalId::new(),
            TenantId::new(),
            vec![Role::new("admin")],
            Duration::minutes(30),
        )
    }

    #[test]
    fn round_trip_validates() {
        let claims = fresh_claims();
        let token = mint(&claims, "test-secret");

        let validator = Hs256JwtValidator::new("test-secret");
        let decoded = validator.validate(&token, Utc::now()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint(&fresh_claims(), "secret-a");

        let validator = Hs256JwtValidator::new("secret-b");
        let err = validator.validate(&token, Utc::now()).unwrap_err();
        assert!(matches!(err, JwtError::Decode(_)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let validator = Hs256JwtValidator::new("test-secret");
        let err = validator.validate("not.a.jwt", Utc::now()).unwrap_err();
        assert!(matches!(err, JwtError::Decode(_)));
    }

    #[test]
    fn expired_claims_fail_after_signature_check() {
        let mut claims = fresh_claims();
        claims.issued_at = Utc::now() - Duration::hours(2);
        claims.expires_at = Utc::now() - Duration::hours(1);
        let token = mint(&claims, "test-secret");

        let validator = Hs256JwtValidator::new("test-secret");
        let err = validator.validate(&token, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            JwtError::Claims(TokenValidationError::Expired)
        ));
    }
}
