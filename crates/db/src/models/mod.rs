//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row, plus the create/update DTOs its repository accepts.

pub mod allowed_user;
pub mod booking;
pub mod identity;
pub mod role;
pub mod seat;
pub mod seat_layout;
