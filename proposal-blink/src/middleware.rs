//! CORS and action-protocol response headers.

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ActionHeaderValues;

pub const X_ACTION_VERSION: HeaderName = HeaderName::from_static("x-action-version");
pub const X_BLOCKCHAIN_IDS: HeaderName = HeaderName::from_static("x-blockchain-ids");
pub const X_ACCEPT_ACTION_VERSION: HeaderName = HeaderName::from_static("x-accept-action-version");
pub const X_ACCEPT_BLOCKCHAIN_IDS: HeaderName = HeaderName::from_static("x-accept-blockchain-ids");

const ALLOW_METHODS: &str = "GET,POST,PUT,OPTIONS";
const ALLOW_HEADERS: &str = "content-type,authorization,content-encoding,accept-encoding,\
x-accept-action-version,x-accept-blockchain-ids";

/// Permissive CORS as expected by action clients embedded in third-party pages.
pub fn action_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::CONTENT_ENCODING,
            header::ACCEPT_ENCODING,
            X_ACCEPT_ACTION_VERSION,
            X_ACCEPT_BLOCKCHAIN_IDS,
        ])
        .expose_headers([X_ACTION_VERSION, X_BLOCKCHAIN_IDS])
}

/// Stamps the protocol version and blockchain identifier on every response.
pub async fn action_headers(
    State(values): State<ActionHeaderValues>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(X_ACTION_VERSION, values.action_version);
    headers.insert(X_BLOCKCHAIN_IDS, values.blockchain_ids);
    response
}

/// Repeats the allowed methods and headers on non-preflight responses, which
/// action clients read from ordinary GET/POST replies as well.
pub async fn cors_response_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    if !headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
    }
    if !headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }
    response
}
