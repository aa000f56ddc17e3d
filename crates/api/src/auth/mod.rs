//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and verification of credential secrets.
//! - [`jwt`] -- JWT access-token generation and validation.

pub mod jwt;
pub mod password;
