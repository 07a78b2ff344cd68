use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use tracing::{error, info};
use utoipa::OpenApi;

use crate::action;
use crate::dtos::{
    ActionDescriptor, ActionError, ActionsManifest, LinkErrorBody, LinkQuery, RedirectDescriptor,
    ServerErrorBody,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::ApiDoc;

/// Routing manifest for action discovery.
#[utoipa::path(
    get,
    path = "/actions.json",
    responses(
        (status = 200, description = "Routing rules mapping site paths to action API paths", body = ActionsManifest)
    )
)]
pub async fn actions_manifest() -> Json<ActionsManifest> {
    Json(action::actions_manifest())
}

/// Describes the trade link for a proposal.
///
/// Looks the proposal up in the indexer and returns an action whose single link
/// points at the link endpoint of this service.
#[utoipa::path(
    get,
    path = "/api/proposal-link/{segment}",
    params(("segment" = String, Path, description = "Proposal account")),
    responses(
        (status = 200, description = "Action describing the trade link", body = ActionDescriptor),
        (status = 400, description = "Proposal or DAO slug not found", body = ActionError),
        (status = 500, description = "Indexer query failed", body = ServerErrorBody)
    )
)]
pub async fn proposal_action(
    State(state): State<AppState>,
    Path(proposal_account): Path<String>,
) -> ApiResult<Json<ActionDescriptor>> {
    resolve_action(&state, &proposal_account).await.map(Json)
}

/// Describes the trade link for a proposal addressed under its DAO.
///
/// The DAO segment is informational; the slug used in the link always comes
/// from the indexer.
#[utoipa::path(
    get,
    path = "/api/proposal-link/{segment}/trade/{proposal_account}",
    params(
        ("segment" = String, Path, description = "DAO slug as it appears in the page URL"),
        ("proposal_account" = String, Path, description = "Proposal account")
    ),
    responses(
        (status = 200, description = "Action describing the trade link", body = ActionDescriptor),
        (status = 400, description = "Proposal or DAO slug not found", body = ActionError),
        (status = 500, description = "Indexer query failed", body = ServerErrorBody)
    )
)]
pub async fn dao_proposal_action(
    State(state): State<AppState>,
    Path((dao_slug, proposal_account)): Path<(String, String)>,
) -> ApiResult<Json<ActionDescriptor>> {
    info!(%dao_slug, %proposal_account, "resolving proposal addressed by dao");
    resolve_action(&state, &proposal_account).await.map(Json)
}

async fn resolve_action(state: &AppState, proposal_account: &str) -> ApiResult<ActionDescriptor> {
    let details = state
        .indexer
        .proposal_details(proposal_account)
        .await
        .map_err(|err| {
            error!(%proposal_account, error = %err, "indexer lookup failed");
            ApiError::from(err)
        })?
        .ok_or(ApiError::ProposalNotFound)?;

    action::proposal_action(&state.config, proposal_account, &details)
}

/// Resolves the external trading page for a proposal.
///
/// Also answers GET so the link can be followed directly.
#[utoipa::path(
    post,
    path = "/api/proposal-link/link",
    params(
        ("proposalAccount" = String, Query, description = "Proposal account"),
        ("slug" = String, Query, description = "DAO slug")
    ),
    responses(
        (status = 200, description = "External link to the trading page", body = RedirectDescriptor),
        (status = 400, description = "Missing or malformed query parameter", body = LinkErrorBody)
    )
)]
pub async fn proposal_link(
    State(state): State<AppState>,
    query: Result<Query<LinkQuery>, QueryRejection>,
) -> ApiResult<Json<RedirectDescriptor>> {
    let Query(query) = query.map_err(|rejection| ApiError::InvalidLink(rejection.body_text()))?;
    let proposal_account = query
        .proposal_account
        .ok_or_else(|| ApiError::InvalidLink("missing query parameter: proposalAccount".into()))?;
    let slug = query
        .slug
        .ok_or_else(|| ApiError::InvalidLink("missing query parameter: slug".into()))?;

    Ok(Json(action::redirect(&state.config.app_host, &slug, &proposal_account)))
}

pub async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
