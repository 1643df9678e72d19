// Provisioning service endpoints: users, enterprise units, role grants.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::ServerTarget;
use crate::client::{BspClient, Method, with_query};
use crate::error::Error;
use crate::models::{CreatedUser, EnterpriseUnit, PageContent, UserStatus};
use crate::pagination::Paginator;
use crate::transport::TransportConfig;

/// HTTP client for the provisioning service.
#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    inner: BspClient,
}

impl ProvisioningClient {
    pub fn new(target: ServerTarget, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_client(BspClient::new(target, transport)?))
    }

    pub fn from_client(inner: BspClient) -> Self {
        Self { inner }
    }

    // ── Users ────────────────────────────────────────────────────────

    /// Users whose name matches `username_pattern` (`*` for all).
    ///
    /// `GET provisioning/users?pageNumber=N&usernamePattern=P`
    pub fn users(&self, username_pattern: &str) -> Paginator<Value> {
        Paginator::new(self.inner.clone(), Method::Get, "provisioning/users")
            .param("usernamePattern", username_pattern)
    }

    /// Create a user. Password change on first login is never forced.
    ///
    /// `POST provisioning/users`
    pub async fn create_user(
        &self,
        username: &str,
        status: UserStatus,
    ) -> Result<CreatedUser, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            username: &'a str,
            force_password_change: bool,
            status: UserStatus,
        }

        debug!(username, "creating user");
        self.inner
            .post(
                "provisioning/users",
                &Body {
                    username,
                    force_password_change: false,
                    status,
                },
            )
            .await
    }

    // ── Enterprise units ─────────────────────────────────────────────

    /// Enterprise units whose name matches `name_pattern`.
    ///
    /// `GET provisioning/enterprise-units?namePattern=P`
    pub async fn enterprise_units(
        &self,
        name_pattern: &str,
    ) -> Result<PageContent<EnterpriseUnit>, Error> {
        self.inner
            .get(&with_query(
                "provisioning/enterprise-units",
                &[("namePattern", name_pattern)],
            ))
            .await
    }

    /// Give `username` access to an enterprise unit.
    ///
    /// `POST provisioning/enterprise-unit-grants`
    pub async fn grant_enterprise_unit_to_user(
        &self,
        enterprise_unit_id: &str,
        username: &str,
    ) -> Result<Value, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            enterprise_unit_id: &'a str,
            username: &'a str,
        }

        debug!(enterprise_unit_id, username, "granting enterprise unit");
        self.inner
            .post(
                "provisioning/enterprise-unit-grants",
                &Body {
                    enterprise_unit_id,
                    username,
                },
            )
            .await
    }

    // ── Role grants ──────────────────────────────────────────────────

    /// `GET provisioning/role-grants/group-grants/{group}/effective-roles`
    pub async fn effective_roles(&self, group_name: &str) -> Result<PageContent<Value>, Error> {
        self.inner
            .get(&format!(
                "provisioning/role-grants/group-grants/{group_name}/effective-roles"
            ))
            .await
    }

    /// `GET provisioning/role-grants/group-grants/{group}/granted-roles`
    pub async fn granted_roles(&self, group_name: &str) -> Result<PageContent<Value>, Error> {
        self.inner
            .get(&format!(
                "provisioning/role-grants/group-grants/{group_name}/granted-roles"
            ))
            .await
    }
}
