use crate::controller::ApiResponse;
use crate::error::Result as WebResult;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::engagement::{CommentParams, LikeParams, MessageParams};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domain::Id;
use events::DomainEvent;
use serde_json::json;
use uuid::Uuid;

/// Feature endpoints whose core responsibility is pushing realtime events.
///
/// Persistence of likes/comments/follows/messages lives in the excluded
/// storage collaborator; these handlers validate the caller, publish the
/// matching domain event toward the relay (fire-and-forget, no delivery
/// result checked), and answer immediately with the envelope.

/// POST a like on a post; the post's author hears about it if online.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/likes",
    params(("post_id" = Uuid, Path, description = "The liked post")),
    request_body(content = LikeParams, content_type = "application/json"),
    responses(
        (status = 201, description = "Like recorded and realtime event published"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_like(
    AuthenticatedUser(subject): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(params): Json<LikeParams>,
) -> WebResult<impl IntoResponse> {
    let liker = app_state.user_directory.find_by_id(subject).await?;
    let liked_by = serde_json::to_value(&liker)?;

    app_state
        .event_publisher
        .publish(DomainEvent::PostLiked {
            post_id,
            liked_by: liked_by.clone(),
            notify_user_id: params.author_id,
        })
        .await;

    // The author also receives a notification entry, mirroring the
    // persistent notification record the storage collaborator creates.
    app_state
        .event_publisher
        .publish(DomainEvent::NotificationCreated {
            notification: json!({
                "id": Uuid::new_v4(),
                "type": "like",
                "postId": post_id,
                "from": liked_by,
            }),
            notify_user_id: params.author_id,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            json!({ "postId": post_id, "likedBy": liker }),
        )),
    ))
}

/// POST a comment on a post; the post's author is notified.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comments",
    params(("post_id" = Uuid, Path, description = "The commented post")),
    request_body(content = CommentParams, content_type = "application/json"),
    responses(
        (status = 201, description = "Comment recorded and realtime event published"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    AuthenticatedUser(subject): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(params): Json<CommentParams>,
) -> WebResult<impl IntoResponse> {
    let commenter = app_state.user_directory.find_by_id(subject).await?;
    let comment = json!({
        "id": Uuid::new_v4(),
        "content": params.content,
        "user": commenter,
    });

    app_state
        .event_publisher
        .publish(DomainEvent::CommentAdded {
            post_id,
            comment: comment.clone(),
            notify_user_id: params.author_id,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            json!({ "postId": post_id, "comment": comment }),
        )),
    ))
}

/// POST a follow of another user; the followed user is notified.
#[utoipa::path(
    post,
    path = "/users/{user_id}/follows",
    params(("user_id" = Uuid, Path, description = "The user being followed")),
    responses(
        (status = 201, description = "Follow recorded and realtime event published"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Followed user does not exist")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_follow(
    AuthenticatedUser(subject): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> WebResult<impl IntoResponse> {
    // The followed user must exist; the follower we already authenticated.
    app_state.user_directory.find_by_id(user_id).await?;
    let follower = app_state.user_directory.find_by_id(subject).await?;

    app_state
        .event_publisher
        .publish(DomainEvent::FollowCreated {
            follower: serde_json::to_value(&follower)?,
            notify_user_id: user_id,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            json!({ "followedUserId": user_id, "follower": follower }),
        )),
    ))
}

/// POST a direct message; the recipient is notified immediately if online.
#[utoipa::path(
    post,
    path = "/messages",
    request_body(content = MessageParams, content_type = "application/json"),
    responses(
        (status = 201, description = "Message accepted and realtime event published"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_message(
    AuthenticatedUser(subject): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<MessageParams>,
) -> WebResult<impl IntoResponse> {
    let sender = app_state.user_directory.find_by_id(subject).await?;
    let message = json!({
        "id": Uuid::new_v4(),
        "content": params.content,
        "sender": sender,
        "recipientId": params.recipient_id,
    });

    app_state
        .event_publisher
        .publish(DomainEvent::MessageSent {
            message: message.clone(),
            notify_user_id: params.recipient_id,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), message)),
    ))
}
