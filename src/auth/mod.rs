//! Authentication and authorization for Laurel
//!
//! Provides:
//! - JWT token validation
//! - Revoked token tracking
//! - Route permission gate (coarse, per endpoint)
//! - Authorization evaluator (fine-grained, per achievement)

pub mod evaluator;
pub mod jwt;
pub mod permissions;
pub mod revocation;
pub mod role;

pub use evaluator::{decide, Decision, DenyReason, Operation, ResourceFacts, Subject};
pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput, TokenValidationResult};
pub use permissions::{is_endpoint_allowed, required_permission, Endpoint};
pub use revocation::RevocationList;
pub use role::{Actor, Role, UnknownRole};
