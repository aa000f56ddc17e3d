//! Email normalisation for the allow-list and identity store.

use validator::ValidateEmail;

/// Trim surrounding whitespace and lower-case an email address.
///
/// Applied before every lookup and every insert so that `Alice@X.org ` and
/// `alice@x.org` resolve to the same identity.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether an already-normalised email is syntactically acceptable.
pub fn is_valid_email(email: &str) -> bool {
    email.to_string().validate_email()
}
