//! Input rules and lifecycle stages for admin account provisioning.
//!
//! A provisioning request moves through:
//!
//! ```text
//! Pending -> AuthChecked -> Validated -> Provisioned -> Committed
//!        \-> Rejected     \-> Rejected               \-> Failed
//! ```
//!
//! Authorization happens in the HTTP layer, the writes in
//! `theatre_db::repositories::ProvisioningRepo`. This module owns validation.

use crate::email::{is_valid_email, normalize_email};
use crate::error::CoreError;
use crate::roles::AppRole;

/// Shortest secret accepted for a new identity.
pub const MIN_SECRET_LENGTH: usize = 6;

/// Raw provisioning input as received from the admin client.
#[derive(Debug, Default)]
pub struct ProvisionInput {
    pub email: Option<String>,
    pub secret: Option<String>,
    pub role: Option<AppRole>,
}

/// Provisioning input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProvision {
    /// Normalised (trimmed, lower-cased) email.
    pub email: String,
    pub secret: String,
    pub role: AppRole,
}

/// Validate provisioning input.
///
/// Both `email` and `secret` are required; blank values count as missing.
/// The email is normalised before the syntax check and `role` defaults to
/// [`AppRole::User`].
pub fn validate(input: ProvisionInput) -> Result<ValidatedProvision, CoreError> {
    let email = input
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());
    let secret = input.secret.filter(|s| !s.trim().is_empty());

    let (email, secret) = match (email, secret) {
        (Some(email), Some(secret)) => (email, secret),
        _ => {
            return Err(CoreError::Validation(
                "Email and secret are required".into(),
            ))
        }
    };

    if !is_valid_email(&email) {
        return Err(CoreError::Validation(format!("Invalid email: {email}")));
    }
    if secret.chars().count() < MIN_SECRET_LENGTH {
        return Err(CoreError::Validation(format!(
            "Secret must be at least {MIN_SECRET_LENGTH} characters long"
        )));
    }

    Ok(ValidatedProvision {
        email,
        secret,
        role: input.role.unwrap_or_default(),
    })
}

/// Lifecycle stage of a provisioning request, recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    Pending,
    AuthChecked,
    Validated,
    Provisioned,
    Committed,
    Rejected,
    Failed,
}

impl ProvisionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AuthChecked => "auth_checked",
            Self::Validated => "validated",
            Self::Provisioned => "provisioned",
            Self::Committed => "committed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    /// Terminal stages end the request.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Rejected | Self::Failed)
    }
}

impl std::fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
