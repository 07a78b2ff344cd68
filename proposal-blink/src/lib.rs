//! # Proposal Blink
//!
//! HTTP service exposing action ("blink") metadata for governance proposals.
//!
//! - `GET /actions.json` returns the routing manifest used for action discovery.
//! - `GET /api/proposal-link/{proposalAccount}` and
//!   `GET /api/proposal-link/{daoSlug}/trade/{proposalAccount}` look the proposal
//!   up in the GraphQL indexer and describe a link to its trading page.
//! - `GET|POST /api/proposal-link/link?proposalAccount=..&slug=..` returns the
//!   final external link.
//! - `GET /api-docs/openapi.json` serves the OpenAPI document.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

pub mod action;
pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod indexer;
pub mod middleware;
pub mod state;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "proposal-blink", description = "Action metadata for governance proposal trading"),
    paths(
        handlers::actions_manifest,
        handlers::proposal_action,
        handlers::dao_proposal_action,
        handlers::proposal_link,
    ),
    components(schemas(
        dtos::ActionDescriptor,
        dtos::LinkedActions,
        dtos::LinkedAction,
        dtos::RedirectDescriptor,
        dtos::ActionError,
        dtos::ServerErrorBody,
        dtos::LinkErrorBody,
        dtos::ActionsManifest,
        dtos::ActionRule,
        dtos::ActionKind,
        dtos::LinkKind,
        dtos::ErrorKind,
    ))
)]
pub struct ApiDoc;

/// Builds the router with every endpoint and the protocol middleware.
pub fn create_router(state: AppState) -> Router {
    // Both proposal shapes share the name of their first parameter so the
    // router can hold them side by side.
    let mut router = Router::new()
        .route("/actions.json", get(handlers::actions_manifest))
        .route(
            "/api/proposal-link/link",
            get(handlers::proposal_link).post(handlers::proposal_link),
        )
        .route("/api/proposal-link/{segment}", get(handlers::proposal_action))
        .route(
            "/api/proposal-link/{segment}/trade/{proposal_account}",
            get(handlers::dao_proposal_action),
        )
        .route("/api-docs/openapi.json", get(handlers::openapi_document));

    if let Some(values) = state.config.action_headers.clone() {
        router = router.layer(from_fn_with_state(values, middleware::action_headers));
    }

    router
        .layer(from_fn(middleware::cors_response_headers))
        .layer(middleware::action_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until Ctrl-C.
pub async fn start_server(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    info!(
        %addr,
        indexer = %config.indexer_url,
        base_url = %config.base_url,
        app_host = %config.app_host,
        action_headers = config.action_headers.is_some(),
        "starting proposal-blink server"
    );

    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
