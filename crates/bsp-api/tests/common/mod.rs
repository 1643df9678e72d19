#![allow(dead_code)]
// Shared wiremock fixtures for bsp-api integration tests.

use bsp_api::{BspClient, Credentials, ServerTarget};
use secrecy::SecretString;
use wiremock::MockServer;

pub const APP_KEY: &str = "app-key-123";
pub const SECRET_KEY: &str = "secret-key-456";
pub const SHARED_KEY: &str = "shared-key-789";
pub const ORGANIZATION: &str = "org-test";

pub fn credentials() -> Credentials {
    Credentials {
        app_key: APP_KEY.into(),
        secret_key: SecretString::from(SECRET_KEY),
        shared_key: SecretString::from(SHARED_KEY),
        organization: ORGANIZATION.into(),
    }
}

/// Target pointing at the mock server over plain HTTP.
pub fn target_for(server: &MockServer) -> ServerTarget {
    let addr = server.address();
    ServerTarget::new(addr.ip().to_string(), credentials())
        .with_port(Some(addr.port()))
        .with_tls(false)
}

pub async fn setup() -> (MockServer, BspClient) {
    let server = MockServer::start().await;
    let client = BspClient::with_client(reqwest::Client::new(), target_for(&server));
    (server, client)
}
