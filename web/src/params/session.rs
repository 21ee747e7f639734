use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login credentials. Field names mirror the JSON contract the frontend
/// already sends.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginParams {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterParams {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshParams {
    pub(crate) refresh_token: String,
}
