//! Request extractors shared by handlers.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json<T>` whose rejection is an [`AppError`], so a missing or malformed
/// body answers 400 with the usual `{"error","code"}` envelope instead of
/// axum's plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
