//! Domain logic for the theatre seat-reservation service.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` crate
//! evaluates these rules inside its transactions and the `api` crate maps
//! [`error::CoreError`] onto HTTP responses.

pub mod email;
pub mod error;
pub mod layout;
pub mod policy;
pub mod provisioning;
pub mod roles;
pub mod types;
