pub mod admin;
pub mod auth;
pub mod bookings;
pub mod layout;
pub mod me;
pub mod seats;
