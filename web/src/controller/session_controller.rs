use crate::controller::ApiResponse;
use crate::error::Result as WebResult;
use crate::params::session::{LoginParams, RefreshParams, RegisterParams};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use domain::user::NewUser;
use log::*;
use serde_json::json;

/// Logs the user into the platform and returns a freshly issued
/// access/refresh credential pair.
///
/// The access token must be passed back on every API call as
/// `Authorization: Bearer <token>` and on the WebSocket handshake. When it
/// expires, clients call `/auth/refresh` once and retry; if that also fails
/// they must re-authenticate.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Logs in and returns the user plus an access/refresh token pair"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> WebResult<impl IntoResponse> {
    let user = app_state
        .user_directory
        .authenticate(&params.email, &params.password)
        .await
        .inspect_err(|_| warn!("Authentication failed for email {:?}", params.email))?;

    let pair = app_state.tokens.issue(user.id)?;

    debug!("Issued credential pair for user {}", user.id);

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({
            "user": user,
            "accessToken": pair.access_token,
            "refreshToken": pair.refresh_token,
        }),
    )))
}

/// Registers a new user and logs them in, in one step.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(content = RegisterParams, content_type = "application/json"),
    responses(
        (status = 201, description = "User created; returns the user plus a token pair"),
        (status = 409, description = "Email or username already taken"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(params): Json<RegisterParams>,
) -> WebResult<impl IntoResponse> {
    let user = app_state
        .user_directory
        .register(NewUser {
            username: params.username,
            email: params.email,
            password: params.password,
        })
        .await?;

    let pair = app_state.tokens.issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            json!({
                "user": user,
                "accessToken": pair.access_token,
                "refreshToken": pair.refresh_token,
            }),
        )),
    ))
}

/// Atomically re-mints both credentials from a refresh credential.
///
/// Fails uniformly with 401 whether the token is malformed, expired, the
/// wrong variant, or its subject no longer exists.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body(content = RefreshParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Returns a new access/refresh token pair"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    Json(params): Json<RefreshParams>,
) -> WebResult<impl IntoResponse> {
    let pair = app_state
        .tokens
        .refresh(&params.refresh_token, &app_state.user_directory)
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), pair)))
}
