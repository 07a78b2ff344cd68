use proposal_blink_macros::api_dto;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discriminator of an action GET response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Action,
}

/// Discriminator of a linked action or a link response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    ExternalLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Error,
}

/// Client-renderable description of a proposal and the link to trade it.
#[api_dto]
pub struct ActionDescriptor {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub icon: String,
    pub title: String,
    pub label: String,
    pub description: String,
    pub links: LinkedActions,
}

#[api_dto]
pub struct LinkedActions {
    pub actions: Vec<LinkedAction>,
}

/// A single external link offered by an action.
#[api_dto]
pub struct LinkedAction {
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub label: String,
    pub href: String,
}

/// Final, fully resolved external link.
#[api_dto]
pub struct RedirectDescriptor {
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub external_link: String,
}

/// Structured 400 body of the action endpoint.
#[api_dto]
pub struct ActionError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

/// 500 body returned when the indexer cannot be queried.
#[api_dto]
pub struct ServerErrorBody {
    pub message: String,
}

/// 400 body of the link endpoint.
#[api_dto]
pub struct LinkErrorBody {
    pub error: String,
}

/// Routing manifest served at `/actions.json`.
#[api_dto]
pub struct ActionsManifest {
    pub rules: Vec<ActionRule>,
}

#[api_dto]
pub struct ActionRule {
    pub path_pattern: String,
    pub api_path: String,
}

/// Query string of the link endpoint. Both fields are required; they are
/// optional here so a missing one is reported in the endpoint's own error shape.
#[api_dto]
pub struct LinkQuery {
    pub proposal_account: Option<String>,
    pub slug: Option<String>,
}
