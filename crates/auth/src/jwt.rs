//! HS256 token signing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::{TokenClaims, TokenValidationError, UserRecord, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is expired")]
    Expired,

    #[error("token is not valid: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Issues and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user`, bound to its current token version.
    pub fn issue(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user.id,
            role_code: user.role_code.clone(),
            version: user.token_version,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl JwtValidator for TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        // Time window is checked against the caller's clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleCode;
    use claimdesk_core::{RecordMeta, UserId};

    fn user() -> UserRecord {
        UserRecord {
            id: UserId::new(),
            email: "staff@example.com".into(),
            user_name: "staff".into(),
            role_code: RoleCode::APPROVAL,
            is_verified: true,
            is_blocked: false,
            token_version: 3,
            meta: RecordMeta::created(Utc::now()),
        }
    }

    #[test]
    fn issued_token_validates_and_carries_version() {
        let svc = TokenService::new(b"secret", Duration::hours(1));
        let user = user();
        let now = Utc::now();
        let token = svc.issue(&user, now).unwrap();

        let claims = svc.validate(&token, now).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role_code, RoleCode::APPROVAL);
        assert_eq!(claims.version, 3);
    }

    #[test]
    fn token_past_ttl_is_expired() {
        let svc = TokenService::new(b"secret", Duration::seconds(60));
        let now = Utc::now();
        let token = svc.issue(&user(), now).unwrap();

        let err = svc.validate(&token, now + Duration::seconds(61)).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let issuer = TokenService::new(b"secret", Duration::hours(1));
        let other = TokenService::new(b"other", Duration::hours(1));
        let now = Utc::now();
        let token = issuer.issue(&user(), now).unwrap();

        assert!(matches!(other.validate(&token, now), Err(TokenError::Invalid(_))));
        assert!(matches!(issuer.validate("garbage", now), Err(TokenError::Invalid(_))));
    }
}
