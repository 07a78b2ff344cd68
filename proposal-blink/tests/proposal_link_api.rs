use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use mockito::{Matcher, Mock, ServerGuard};
use proposal_blink::config::{ActionHeaderValues, DEFAULT_ACTION_VERSION, DEFAULT_BLOCKCHAIN_ID};
use proposal_blink::{create_router, AppState, ServiceConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_URL: &str = "https://blinks.example.org";
const APP_HOST: &str = "app.example.org";

fn config(indexer_url: String, action_headers: bool) -> ServiceConfig {
    ServiceConfig {
        port: 3000,
        indexer_url,
        base_url: BASE_URL.to_string(),
        app_host: APP_HOST.to_string(),
        action_headers: action_headers.then(|| ActionHeaderValues {
            action_version: DEFAULT_ACTION_VERSION.parse().unwrap(),
            blockchain_ids: DEFAULT_BLOCKCHAIN_ID.parse().unwrap(),
        }),
        indexer_timeout: Duration::from_secs(5),
    }
}

fn app(server: &ServerGuard, action_headers: bool) -> Router {
    let config = config(format!("{}/v1/graphql", server.url()), action_headers);
    create_router(AppState::new(config).unwrap())
}

async fn mock_indexer(server: &mut ServerGuard, account: &str, rows: Value) -> Mock {
    server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({ "variables": { "proposalAcct": account } })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": { "proposal_details": rows } }).to_string())
        .create_async()
        .await
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    app.oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn meta_dao_row() -> Value {
    json!([{
        "proposal_acct": "ABC123",
        "title": "Upgrade Treasury",
        "description": "Move funds",
        "proposal": { "dao": { "dao_detail": { "slug": "meta-dao" } } }
    }])
}

#[tokio::test]
async fn resolves_proposal_into_action() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_indexer(&mut server, "ABC123", meta_dao_row()).await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/ABC123").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    mock.assert_async().await;
    assert_eq!(body["type"], "action");
    assert_eq!(body["title"], "Upgrade Treasury");
    assert_eq!(body["label"], "Proposal link");
    assert_eq!(body["description"], "");
    assert_eq!(body["links"]["actions"][0]["type"], "external-link");
    assert_eq!(body["links"]["actions"][0]["label"], "Trade proposal");
    assert_eq!(
        body["links"]["actions"][0]["href"],
        "https://blinks.example.org/api/proposal-link/link?proposalAccount=ABC123&slug=meta-dao"
    );
}

#[tokio::test]
async fn dao_scoped_path_resolves_the_same_action() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_indexer(&mut server, "ABC123", meta_dao_row()).await;

    let response = send(
        app(&server, false),
        Method::GET,
        "/api/proposal-link/whatever-dao/trade/ABC123",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Slug comes from the indexer, not from the path.
    assert_eq!(
        body["links"]["actions"][0]["href"],
        "https://blinks.example.org/api/proposal-link/link?proposalAccount=ABC123&slug=meta-dao"
    );
}

#[tokio::test]
async fn unknown_proposal_is_400() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_indexer(&mut server, "NOPE", json!([])).await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/NOPE").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "type": "error", "message": "Proposal not found" })
    );
}

#[tokio::test]
async fn proposal_without_slug_is_400() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_indexer(
        &mut server,
        "ABC123",
        json!([{ "proposal_acct": "ABC123", "title": "Orphan", "proposal": { "dao": null } }]),
    )
    .await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/ABC123").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "type": "error", "message": "DAO slug not found" })
    );
}

#[tokio::test]
async fn indexer_failure_is_500_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/graphql")
        .with_status(503)
        .with_body("maintenance")
        .expect(1)
        .create_async()
        .await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/ABC123").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    mock.assert_async().await;
    assert_eq!(body["message"], "indexer responded with status 503: maintenance");
}

#[tokio::test]
async fn link_endpoint_formats_external_link_for_post_and_get() {
    let server = mockito::Server::new_async().await;

    for method in [Method::POST, Method::GET] {
        let response = send(
            app(&server, false),
            method,
            "/api/proposal-link/link?proposalAccount=ABC123&slug=meta-dao",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "type": "external-link",
                "externalLink": "https://app.example.org/meta-dao/trade/ABC123",
            })
        );
    }
}

#[tokio::test]
async fn link_endpoint_requires_both_parameters() {
    let server = mockito::Server::new_async().await;

    let response = send(app(&server, false), Method::POST, "/api/proposal-link/link?slug=meta-dao").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "missing query parameter: proposalAccount" })
    );

    let response = send(
        app(&server, false),
        Method::POST,
        "/api/proposal-link/link?proposalAccount=ABC123",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "missing query parameter: slug" }));
}

#[tokio::test]
async fn following_the_action_href_reaches_the_trading_page() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_indexer(
        &mut server,
        "Acc 1&2",
        json!([{
            "proposal_acct": "Acc 1&2",
            "title": "Odd account",
            "proposal": { "dao": { "dao_detail": { "slug": "future dao" } } }
        }]),
    )
    .await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/Acc%201%262").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let href = body["links"]["actions"][0]["href"].as_str().unwrap().to_string();
    let path_and_query = href.strip_prefix(BASE_URL).unwrap();

    let response = send(app(&server, false), Method::POST, path_and_query).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["externalLink"],
        "https://app.example.org/future dao/trade/Acc 1&2"
    );
}

#[tokio::test]
async fn actions_manifest_is_static() {
    let server = mockito::Server::new_async().await;

    let first = body_json(send(app(&server, false), Method::GET, "/actions.json").await).await;
    let second = body_json(send(app(&server, true), Method::GET, "/actions.json").await).await;

    assert_eq!(first, second);
    assert_eq!(
        first,
        json!({
            "rules": [
                { "pathPattern": "/*", "apiPath": "/api/proposal-link/*" },
                { "pathPattern": "/api/proposal-link/**", "apiPath": "/api/proposal-link/**" }
            ]
        })
    );
}

#[tokio::test]
async fn action_headers_follow_configuration() {
    let server = mockito::Server::new_async().await;

    let response = send(app(&server, true), Method::GET, "/actions.json").await;
    assert_eq!(response.headers()["x-action-version"], DEFAULT_ACTION_VERSION);
    assert_eq!(response.headers()["x-blockchain-ids"], DEFAULT_BLOCKCHAIN_ID);

    let response = send(app(&server, false), Method::GET, "/actions.json").await;
    assert!(response.headers().get("x-action-version").is_none());
    assert!(response.headers().get("x-blockchain-ids").is_none());
}

#[tokio::test]
async fn cors_preflight_is_permissive() {
    let server = mockito::Server::new_async().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/proposal-link/link")
        .header(header::ORIGIN, "https://wallet.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app(&server, false).oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn serves_openapi_document() {
    let server = mockito::Server::new_async().await;

    let response = send(app(&server, false), Method::GET, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"].get("/actions.json").is_some());
    assert!(body["paths"]["/api/proposal-link/link"].get("post").is_some());
}

#[tokio::test]
async fn null_result_list_is_proposal_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_indexer(&mut server, "ABC", Value::Null).await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/ABC").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "type": "error", "message": "Proposal not found" })
    );
}

#[tokio::test]
async fn malformed_link_query_uses_error_body() {
    let server = mockito::Server::new_async().await;

    let response = send(
        app(&server, false),
        Method::POST,
        "/api/proposal-link/link?proposalAccount=A&slug=x&slug=y",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("slug"), "unexpected error text: {error}");
}

#[tokio::test]
async fn undecodable_indexer_body_is_500() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/graphql")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let response = send(app(&server, false), Method::GET, "/api/proposal-link/ABC123").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("failed to decode indexer response: "));
}

#[tokio::test]
async fn hung_indexer_times_out_as_500() {
    // Accepts connections and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut config = config(format!("http://{addr}/v1/graphql"), false);
    config.indexer_timeout = Duration::from_secs(1);
    let app = create_router(AppState::new(config).unwrap());

    let response = tokio::time::timeout(
        Duration::from_secs(10),
        send(app, Method::GET, "/api/proposal-link/X"),
    )
    .await
    .expect("request should be cut off by the indexer timeout");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("indexer request failed: "));
}

#[tokio::test]
async fn ordinary_responses_carry_allowed_methods_and_headers() {
    let server = mockito::Server::new_async().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/actions.json")
        .header(header::ORIGIN, "https://wallet.example")
        .body(Body::empty())
        .unwrap();
    let response = app(&server, false).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap();
    assert!(allowed.contains("x-accept-action-version"));
    assert!(allowed.contains("x-accept-blockchain-ids"));
}
