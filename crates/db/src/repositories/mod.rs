//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Methods that change `bookings`,
//! `seats.is_booked`, the seat grid, identities or roles take the acting
//! [`Caller`](theatre_core::policy::Caller), evaluate the access policy and run
//! in one transaction.

pub mod allowed_user_repo;
pub mod booking_repo;
pub mod identity_repo;
pub mod provisioning_repo;
pub mod role_repo;
pub mod seat_layout_repo;
pub mod seat_repo;

pub use allowed_user_repo::AllowedUserRepo;
pub use booking_repo::BookingRepo;
pub use identity_repo::IdentityRepo;
pub use provisioning_repo::ProvisioningRepo;
pub use role_repo::RoleRepo;
pub use seat_layout_repo::SeatLayoutRepo;
pub use seat_repo::SeatRepo;
