pub(crate) mod authenticated_user;

use axum::http::StatusCode;

/// Rejection shape shared by the extractors in this module.
pub(crate) type RejectionType = (StatusCode, String);
