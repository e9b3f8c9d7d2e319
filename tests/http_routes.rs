mod common;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, StatusCode, header},
    routing::get,
};
use serde_json::{Value, json};
use syntect_edge::{
    application::{
        render::{EngineGate, EngineInitError},
        response::{DEFAULT_FALLBACK_URL, ResponseBuilder},
    },
    cache::{CacheAside, CacheConfig, Sha256Hasher},
    config::FetchSettings,
    infra::{
        fetch::ReqwestThemeFetcher,
        http::{HttpState, REQUEST_ID_HEADER, build_router},
    },
};
use tokio::net::TcpListener;

use common::{HarnessBuilder, harness, post_json, request, send};

const PREFIX_32: &str = "abcdefghijklmnopqrstuvwxyz012345";
const PREFIX_33: &str = "abcdefghijklmnopqrstuvwxyz0123456";

fn fetcher() -> Arc<ReqwestThemeFetcher> {
    let settings = FetchSettings {
        timeout: std::time::Duration::from_secs(2),
        user_agent: "syntect-edge-tests".to_string(),
    };
    Arc::new(ReqwestThemeFetcher::new(&settings).expect("fetcher should build"))
}

#[tokio::test]
async fn unmapped_routes_redirect_to_fallback() {
    let harness = harness();

    for (method, uri) in [
        (Method::GET, "/"),
        (Method::GET, "/does/not/exist"),
        (Method::GET, "/highlight"),
        (Method::PUT, "/css"),
        (Method::DELETE, "/highlight"),
        (Method::POST, "/css/extra"),
    ] {
        let reply = send(&harness.router, request(method.clone(), uri)).await;
        assert_eq!(reply.status, StatusCode::FOUND, "{method} {uri}");
        assert_eq!(
            reply.header(header::LOCATION),
            Some(DEFAULT_FALLBACK_URL),
            "{method} {uri}"
        );
    }

    assert_eq!(harness.engine.highlights(), 0);
    assert_eq!(harness.engine.themes(), 0);
}

#[tokio::test]
async fn highlight_returns_plain_html_by_default() {
    let harness = harness();

    let reply = send(
        &harness.router,
        post_json(
            "/highlight",
            json!({ "code": "let x = 1;", "language": "rust", "prefix": "hl-" }).to_string(),
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("text/html"));
    assert_eq!(reply.body, "<span class=\"hl-source\">let x = 1;</span>");
}

#[tokio::test]
async fn verbose_highlight_returns_json_with_language() {
    let harness = harness();

    let reply = send(
        &harness.router,
        post_json(
            "/highlight",
            json!({ "code": "x", "language": "rust", "verbose": true }).to_string(),
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("application/json"));

    let value: Value = serde_json::from_str(&reply.body).expect("json body");
    assert_eq!(
        value,
        json!({ "html": "<span class=\"source\">x</span>", "language": "RUST" })
    );
}

#[tokio::test]
async fn non_boolean_verbose_is_treated_as_false() {
    let harness = harness();

    let reply = send(
        &harness.router,
        post_json(
            "/highlight",
            json!({ "code": "x", "language": "rust", "verbose": "true" }).to_string(),
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("text/html"));
}

#[tokio::test]
async fn successful_responses_are_publicly_cacheable() {
    let harness = harness();
    let expected = ResponseBuilder::default().cache_control().to_string();

    let highlight = send(
        &harness.router,
        post_json("/highlight", r#"{"code":"x","language":"c"}"#),
    )
    .await;
    let css = send(&harness.router, post_json("/css", r#"{"themeData":"<plist/>"}"#)).await;

    for reply in [highlight, css] {
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.header(header::CACHE_CONTROL), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn highlight_rejects_missing_or_mistyped_fields() {
    let harness = harness();

    let cases = [
        (json!({ "language": "rust" }), "Body parameter 'code' must be a string"),
        (json!({ "code": 7, "language": "rust" }), "Body parameter 'code' must be a string"),
        (json!({ "code": "x" }), "Body parameter 'language' must be a string"),
        (
            json!({ "code": "x", "language": null }),
            "Body parameter 'language' must be a string",
        ),
        (json!([]), "Body parameter 'code' must be a string"),
    ];

    for (body, message) in cases {
        let reply = send(&harness.router, post_json("/highlight", body.to_string())).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(reply.body, message, "{body}");
    }

    assert_eq!(harness.engine.highlights(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let harness = harness();

    for uri in ["/highlight", "/css"] {
        let reply = send(&harness.router, post_json(uri, "{not json")).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply.body, "Request body must be valid JSON", "{uri}");
    }
}

#[tokio::test]
async fn prefix_length_limit_is_inclusive_at_32() {
    let harness = harness();

    let accepted = send(
        &harness.router,
        post_json(
            "/highlight",
            json!({ "code": "x", "language": "rust", "prefix": PREFIX_32 }).to_string(),
        ),
    )
    .await;
    assert_eq!(accepted.status, StatusCode::OK);

    let rejected = send(
        &harness.router,
        post_json(
            "/highlight",
            json!({ "code": "x", "language": "rust", "prefix": PREFIX_33 }).to_string(),
        ),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body, "Prefix too long! Max allowed is 32");

    let css = send(
        &harness.router,
        post_json(
            "/css",
            json!({ "themeData": "<plist/>", "prefix": PREFIX_33 }).to_string(),
        ),
    )
    .await;
    assert_eq!(css.status, StatusCode::BAD_REQUEST);
    assert_eq!(css.body, "Prefix too long! Max allowed is 32");

    assert_eq!(harness.engine.highlights(), 1);
    assert_eq!(harness.engine.themes(), 0);
}

#[tokio::test]
async fn css_from_body_requires_theme_data() {
    let harness = harness();

    let reply = send(&harness.router, post_json("/css", r#"{"themeData":42}"#)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, "Body parameter 'themeData' must be a string");
}

#[tokio::test]
async fn css_from_body_returns_prefixed_css() {
    let harness = harness();

    let reply = send(
        &harness.router,
        post_json("/css", r#"{"themeData":"<plist/>","prefix":"x-"}"#),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("text/css"));
    assert_eq!(reply.body, ".x-code { /* 8 bytes */ }");
}

#[tokio::test]
async fn theme_conversion_failure_is_reported_to_the_client() {
    let harness = harness();

    let reply = send(&harness.router, post_json("/css", r#"{"themeData":"invalid"}"#)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body,
        "Failed to generate theme CSS: theme is not a plist"
    );
}

#[tokio::test]
async fn css_from_url_requires_theme_url() {
    let harness = harness();

    let reply = send(&harness.router, request(Method::GET, "/css?prefix=a")).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, "Query parameter 'themeUrl' must be a string");
    assert_eq!(harness.fetcher.calls(), 0);
}

#[tokio::test]
async fn css_from_url_checks_prefix_before_fetching() {
    let harness = harness();

    let uri = format!("/css?themeUrl=https%3A%2F%2Fexample.com%2Ft.tmTheme&prefix={PREFIX_33}");
    let reply = send(&harness.router, request(Method::GET, &uri)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, "Prefix too long! Max allowed is 32");
    assert_eq!(harness.fetcher.calls(), 0);
}

#[tokio::test]
async fn css_from_url_converts_the_fetched_theme() {
    let harness = harness();

    let reply = send(
        &harness.router,
        request(
            Method::GET,
            "/css?themeUrl=https%3A%2F%2Fexample.com%2Ft.tmTheme&prefix=p-",
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("text/css"));
    assert_eq!(reply.body, ".p-code { /* 8 bytes */ }");
    assert_eq!(harness.fetcher.calls(), 1);
}

#[tokio::test]
async fn unreachable_theme_url_is_reported_as_fetch_failure() {
    let harness = HarnessBuilder::default().fetcher(fetcher()).build();

    let reply = send(
        &harness.router,
        request(
            Method::GET,
            "/css?themeUrl=http%3A%2F%2F127.0.0.1%3A1%2Ftheme.tmTheme",
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(
        reply.body.starts_with("Failed to fetch theme: "),
        "unexpected body: {}",
        reply.body
    );
    assert!(
        reply.body.to_ascii_lowercase().contains("connection refused"),
        "cause missing from: {}",
        reply.body
    );
    assert_eq!(harness.engine.themes(), 0);
}

#[tokio::test]
async fn theme_is_fetched_over_http() {
    let theme = include_str!("fixtures/minimal.tmTheme");
    let upstream = Router::new().route("/minimal.tmTheme", get(move || async move { theme }));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.expect("upstream serve");
    });

    let harness = HarnessBuilder::default().fetcher(fetcher()).build();
    let uri = format!("/css?themeUrl=http%3A%2F%2F{addr}%2Fminimal.tmTheme");
    let reply = send(&harness.router, request(Method::GET, &uri)).await;

    assert_eq!(reply.status, StatusCode::OK, "body: {}", reply.body);
    assert_eq!(
        reply.body,
        format!(".code {{ /* {} bytes */ }}", theme.len())
    );
}

#[tokio::test]
async fn upstream_error_status_is_a_fetch_failure() {
    let upstream = Router::new();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.expect("upstream serve");
    });

    let harness = HarnessBuilder::default().fetcher(fetcher()).build();
    let uri = format!("/css?themeUrl=http%3A%2F%2F{addr}%2Fmissing.tmTheme");
    let reply = send(&harness.router, request(Method::GET, &uri)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body.starts_with("Failed to fetch theme: "));
    assert!(reply.body.contains("404"), "unexpected body: {}", reply.body);
}

#[tokio::test]
async fn every_response_carries_its_own_request_id() {
    let harness = harness();

    let mut ids = Vec::new();
    for req in [
        post_json("/highlight", r#"{"code":"x","language":"rust"}"#),
        post_json("/highlight", r#"{"code":"x","language":"rust"}"#),
        post_json("/highlight", "{}"),
        request(Method::GET, "/elsewhere"),
    ] {
        let reply = send(&harness.router, req).await;
        let id = reply
            .header(REQUEST_ID_HEADER)
            .expect("request id header")
            .to_string();
        uuid::Uuid::parse_str(&id).expect("request id is a uuid");
        ids.push(id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4, "ids must be unique: {ids:?}");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let harness = HarnessBuilder::default().max_body_bytes(64).build();

    let code = "x".repeat(256);
    let reply = send(
        &harness.router,
        post_json(
            "/highlight",
            json!({ "code": code, "language": "rust" }).to_string(),
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(harness.engine.highlights(), 0);
}

#[tokio::test]
async fn engine_failure_is_an_internal_error() {
    let gate = EngineGate::new(|| Err(EngineInitError::SyntaxPack("corrupt dump".to_string())));
    let state = HttpState::new(
        gate,
        CacheAside::from_config(&CacheConfig::default()),
        Arc::new(Sha256Hasher),
        fetcher(),
        ResponseBuilder::default(),
        common::DEFAULT_MAX_BODY_BYTES,
    );
    let router = build_router(state);

    let reply = send(
        &router,
        post_json("/highlight", r#"{"code":"x","language":"rust"}"#),
    )
    .await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        reply.body.starts_with("Internal error: "),
        "unexpected body: {}",
        reply.body
    );
}
