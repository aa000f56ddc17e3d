//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the identity from a JWT Bearer token.
//! - [`rbac::RequireAuth`] -- Any authenticated user, with admin status resolved.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
