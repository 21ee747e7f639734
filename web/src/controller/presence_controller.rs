use crate::controller::ApiResponse;
use crate::error::Result as WebResult;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domain::Id;
use serde_json::json;

/// GET the point-in-time set of online users.
///
/// Presence is process-local and in-memory: the answer reflects only
/// connections held by this process at this instant.
#[utoipa::path(
    get,
    path = "/presence",
    responses(
        (status = 200, description = "List of user ids currently holding a live connection"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn index(
    AuthenticatedUser(_subject): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let users = app_state.relay.online_users();
    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({ "users": users }),
    )))
}

/// GET whether a single user currently holds a live connection.
#[utoipa::path(
    get,
    path = "/presence/{user_id}",
    params(("user_id" = Uuid, Path, description = "User id to check")),
    responses(
        (status = 200, description = "Online flag for the user"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    AuthenticatedUser(_subject): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> WebResult<impl IntoResponse> {
    let online = app_state.relay.is_online(&user_id.to_string());
    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({ "userId": user_id, "online": online }),
    )))
}
