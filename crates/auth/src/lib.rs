//! `coreflow-auth` — authentication/authorization boundary for the platform.
//!
//! This crate is intentionally decoupled from HTTP and storage. Token parsing,
//! claim validation and the permission check are all pure functions over plain
//! data; the API layer decides where tokens come from and what roles map to.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError, Principal};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::Permission;
pub use principal::{PrincipalId, TenantMembership};
pub use roles::Role;
