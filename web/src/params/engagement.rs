use domain::Id;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of a like request. The durable post store is an external
/// collaborator, so the caller names the post's author as the notification
/// target instead of this service resolving it from a posts table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikeParams {
    #[schema(value_type = Uuid)]
    pub(crate) author_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentParams {
    #[schema(value_type = Uuid)]
    pub(crate) author_id: Id,
    pub(crate) content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageParams {
    #[schema(value_type = Uuid)]
    pub(crate) recipient_id: Id,
    pub(crate) content: String,
}
