use crate::extractors::RejectionType;
use crate::AppState;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use domain::Id;
use log::*;

/// The authenticated caller's subject id, extracted from the
/// `Authorization: Bearer <access token>` header.
///
/// Feature handlers never inspect token internals; this extractor is the
/// single place where an access credential is turned into a subject. Every
/// verification failure is a uniform 401.
pub(crate) struct AuthenticatedUser(pub Id);

/// Pulls the bearer token out of the `Authorization` header, if present.
/// Shared with the WebSocket handshake, which also accepts a header-borne
/// token.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            trace!("Request without bearer token rejected");
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        })?;

        match app_state.tokens.verify_access(&token) {
            Ok(subject) => Ok(AuthenticatedUser(subject)),
            Err(err) => {
                debug!("Access credential rejected: {err}");
                Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
            }
        }
    }
}
