//! Authorization gate: bearer credential → resolved [`Identity`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::{DirectoryError, Identity, JwtValidator, RoleCode, TokenError, UserDirectory};

/// What an endpoint demands of its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    /// Allowed roles; empty means any authenticated caller.
    pub roles: Vec<RoleCode>,
    /// When set, a request without credentials passes through anonymously.
    pub optional: bool,
}

impl AccessRequirement {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn roles(roles: impl IntoIterator<Item = RoleCode>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            optional: false,
        }
    }

    pub fn optional() -> Self {
        Self {
            roles: Vec::new(),
            optional: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token, authorization denied.")]
    MissingCredential,

    #[error("Token is expired")]
    Expired,

    #[error("Token is not valid")]
    Invalid,

    #[error("Access denied: invalid token!")]
    Revoked,

    #[error("Access denied: insufficient role")]
    InsufficientRole,

    #[error("identity lookup failed: {0}")]
    Directory(String),
}

impl From<TokenError> for AuthError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired => AuthError::Expired,
            TokenError::Invalid(_) | TokenError::Signing(_) => AuthError::Invalid,
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(value: DirectoryError) -> Self {
        AuthError::Directory(value.to_string())
    }
}

/// Resolves callers against the token validator and the user directory.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<dyn JwtValidator>,
    users: Arc<dyn UserDirectory>,
}

impl AuthGate {
    pub fn new(tokens: Arc<dyn JwtValidator>, users: Arc<dyn UserDirectory>) -> Self {
        Self { tokens, users }
    }

    /// Authenticate a raw bearer token against `requirement`.
    ///
    /// Returns `Ok(None)` only for an optional endpoint called without a token.
    pub async fn authenticate(
        &self,
        credential: Option<&str>,
        requirement: &AccessRequirement,
        now: DateTime<Utc>,
    ) -> Result<Option<Identity>, AuthError> {
        let Some(token) = credential else {
            if requirement.optional {
                return Ok(None);
            }
            return Err(AuthError::MissingCredential);
        };

        let claims = self.tokens.validate(token, now).map_err(|e| {
            warn!(reason = %e, "token rejected");
            AuthError::from(e)
        })?;

        let user = self.users.find_user(claims.sub).await?;
        let current = match user {
            Some(u) if u.can_authenticate() => u,
            _ => {
                warn!(user_id = %claims.sub, reason = "unknown or unverified subject", "token revoked");
                return Err(AuthError::Revoked);
            }
        };
        if current.token_version != claims.version {
            warn!(
                user_id = %claims.sub,
                token_version = claims.version,
                current_version = current.token_version,
                reason = "stale token version",
                "token revoked"
            );
            return Err(AuthError::Revoked);
        }

        let identity = Identity {
            id: claims.sub,
            role_code: claims.role_code,
            token_version: claims.version,
        };

        if !requirement.roles.is_empty() && !identity.has_any_role(&requirement.roles) {
            warn!(user_id = %identity.id, role = %identity.role_code, reason = "insufficient role", "access denied");
            return Err(AuthError::InsufficientRole);
        }

        Ok(Some(identity))
    }
}
