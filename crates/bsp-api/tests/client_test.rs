#![allow(clippy::unwrap_used)]
// Integration tests for the signed transport using wiremock.

mod common;

use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use url::Position;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use bsp_api::signing::sign_request;
use bsp_api::{Error, Method};

use common::{APP_KEY, ORGANIZATION, SECRET_KEY, SHARED_KEY, setup};

// ── Wire headers ────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_carries_nep_headers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/site/sites/abc"))
        .and(header("accept", "application/json"))
        .and(header("nep-application-key", APP_KEY))
        .and(header("nep-organization", ORGANIZATION))
        .and(header_exists("nep-correlation-id"))
        .and(header_exists("date"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let site: Value = client.get("site/sites/abc").await.unwrap();
    assert_eq!(site["id"], "abc");
}

#[tokio::test]
async fn test_authorization_signature_verifies_server_side() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/provisioning/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "u" })))
        .mount(&server)
        .await;

    let _: Value = client
        .request(
            Method::Post,
            "provisioning/users?usernamePattern=*",
            Some(&json!({ "username": "u" })),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let req = &requests[0];

    let date_raw = req.headers.get("date").unwrap().to_str().unwrap();
    assert!(date_raw.ends_with(" GMT"), "unexpected Date header {date_raw}");
    let date: DateTime<Utc> = DateTime::parse_from_rfc2822(date_raw).unwrap().into();

    let path_and_query = &req.url[Position::BeforePath..Position::AfterQuery];
    assert_eq!(path_and_query, "/provisioning/users?usernamePattern=*");

    let mut headers = HeaderMap::new();
    for (name, value) in &req.headers {
        headers.insert(name.clone(), value.clone());
    }
    let expected = sign_request(SECRET_KEY, date, "POST", path_and_query, &headers);

    let authorization = req.headers.get("authorization").unwrap().to_str().unwrap();
    assert_eq!(authorization, format!("AccessKey {SHARED_KEY}:{expected}"));
}

#[tokio::test]
async fn test_correlation_id_is_fresh_per_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let _: Value = client.get("a").await.unwrap();
    let _: Value = client.get("b").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let first = requests[0].headers.get("nep-correlation-id").unwrap();
    let second = requests[1].headers.get("nep-correlation-id").unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(header("content-type", "text/xml"))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
    headers.insert("accept", HeaderValue::from_static("text/plain"));
    client
        .send(Method::Post, "doc", Some(b"<x/>".to_vec()), &headers)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_json_calls_send_content_type() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let _: Value = client.get("anything").await.unwrap();
}

// ── Response handling ───────────────────────────────────────────────

#[tokio::test]
async fn test_error_status_keeps_raw_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/site/sites"))
        .respond_with(
            ResponseTemplate::new(409).set_body_string(r#"{"message":"site already exists"}"#),
        )
        .mount(&server)
        .await;

    let result: Result<Value, Error> = client.post("site/sites", &json!({})).await;
    match result {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 409);
            assert_eq!(body, r#"{"message":"site already exists"}"#);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_is_detectable() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.get::<Value>("security/groups").await.unwrap_err();
    assert!(err.is_forbidden(), "expected 403, got: {err:?}");
}

#[tokio::test]
async fn test_empty_body_decodes_as_null() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let value: Value = client.post("security/group-memberships", &json!({})).await.unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get::<bsp_api::CreatedSite>("site/sites/x").await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "expected Deserialization error, got: {result:?}"
    );
}
