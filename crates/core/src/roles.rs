//! Role names and the [`AppRole`] enum.
//!
//! These must match the `CHECK` constraint in
//! `20260301000003_create_user_roles_table.sql`.

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// A role a user can hold. Admins manage users, layout and bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    #[default]
    User,
}

impl AppRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::User => ROLE_USER,
        }
    }

    /// Parse a stored role name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_USER => Some(Self::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
