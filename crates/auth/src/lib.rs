//! `storefront-auth`: authentication boundary (token verification + roles).
//!
//! Token issuance (registration, login) lives outside this repository; this
//! crate only verifies bearer tokens and exposes the identity they carry.
//! It is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use roles::Role;
