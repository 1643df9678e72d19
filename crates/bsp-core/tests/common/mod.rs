#![allow(dead_code)]
// Shared wiremock fixtures for bsp-core integration tests.

use std::path::Path;

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bsp_api::{Credentials, ServerTarget, TransportConfig};
use bsp_core::{InputFile, Provisioner, Services};

pub fn target_for(server: &MockServer) -> ServerTarget {
    let addr = server.address();
    let credentials = Credentials {
        app_key: "app".into(),
        secret_key: SecretString::from("secret"),
        shared_key: SecretString::from("shared"),
        organization: "org".into(),
    };
    ServerTarget::new(addr.ip().to_string(), credentials)
        .with_port(Some(addr.port()))
        .with_tls(false)
}

pub async fn setup() -> (MockServer, Services) {
    let server = MockServer::start().await;
    let services = Services::new(target_for(&server), &TransportConfig::default()).unwrap();
    (server, services)
}

pub fn provisioner(services: &Services, output: &Path) -> Provisioner {
    Provisioner::in_dir(services.clone(), output).unwrap()
}

pub fn input(value: Value) -> InputFile {
    serde_json::from_value(value).unwrap()
}

pub fn page(items: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "pageContent": items, "lastPage": true }))
}

/// `(METHOD, path)` of every request the server saw, in order.
pub async fn calls(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|req| (req.method.to_string(), req.url.path().to_owned()))
        .collect()
}

pub fn call(method: &str, path: &str) -> (String, String) {
    (method.to_owned(), path.to_owned())
}

/// Group listing that reports `SiteControllerUsers` as present.
pub async fn mount_existing_group(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/security/groups"))
        .respond_with(page(json!([{ "groupName": "SiteControllerUsers" }])))
        .mount(server)
        .await;
}

/// Happy-path responses for every step after the group bootstrap.
pub async fn mount_site_steps(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/site/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "site-1" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provisioning/enterprise-units"))
        .respond_with(page(json!([{ "enterpriseUnitId": "eu-1" }])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/provisioning/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "username": "store-1@org" })),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/security/group-memberships"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/provisioning/enterprise-unit-grants"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/security/security-access-keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sharedKey": "issued-shared",
            "secretKey": "issued-secret"
        })))
        .mount(server)
        .await;
}
