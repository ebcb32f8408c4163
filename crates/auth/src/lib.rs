//! `claimdesk-auth`: identity and access boundary.
//!
//! Token handling, the role taxonomy and the authorization gate live here.
//! This crate knows nothing about HTTP; user lookups go through the
//! [`UserDirectory`] seam so storage stays in infra.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use authorize::{AccessRequirement, AuthError, AuthGate};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use identity::{DirectoryError, UserDirectory, UserRecord};
pub use jwt::{JwtValidator, TokenError, TokenService};
pub use principal::Identity;
pub use roles::RoleCode;
