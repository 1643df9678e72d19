// Security service endpoints: groups, memberships, access keys.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::ServerTarget;
use crate::client::{BspClient, Method, with_query};
use crate::error::Error;
use crate::models::{AccessKey, Group, GroupMember, GroupMembers};
use crate::pagination::Paginator;
use crate::transport::TransportConfig;

/// HTTP client for the security service.
#[derive(Debug, Clone)]
pub struct SecurityClient {
    inner: BspClient,
}

impl SecurityClient {
    pub fn new(target: ServerTarget, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_client(BspClient::new(target, transport)?))
    }

    pub fn from_client(inner: BspClient) -> Self {
        Self { inner }
    }

    /// Groups whose name matches `group_name_pattern` (`*` for all).
    ///
    /// `GET security/groups?pageNumber=N&groupNamePattern=P`
    pub fn groups(&self, group_name_pattern: &str) -> Paginator<Group> {
        Paginator::new(self.inner.clone(), Method::Get, "security/groups")
            .param("groupNamePattern", group_name_pattern)
    }

    /// `POST security/groups`
    pub async fn create_group(&self, group_name: &str, description: &str) -> Result<Value, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            group_name: &'a str,
            description: &'a str,
        }

        debug!(group_name, "creating group");
        self.inner
            .post(
                "security/groups",
                &Body {
                    group_name,
                    description,
                },
            )
            .await
    }

    /// `GET security/group-memberships/users?groupName=G`
    pub async fn group_members(&self, group_name: &str) -> Result<GroupMembers, Error> {
        self.inner
            .get(&with_query(
                "security/group-memberships/users",
                &[("groupName", group_name)],
            ))
            .await
    }

    /// `POST security/group-memberships`
    pub async fn add_users_to_group(
        &self,
        group_name: &str,
        members: &[GroupMember],
    ) -> Result<Value, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            group_name: &'a str,
            members: &'a [GroupMember],
        }

        debug!(group_name, count = members.len(), "adding users to group");
        self.inner
            .post(
                "security/group-memberships",
                &Body {
                    group_name,
                    members,
                },
            )
            .await
    }

    /// Issue a new shared/secret key pair for `username`.
    ///
    /// `POST security/security-access-keys`
    pub async fn create_security_access_key(&self, username: &str) -> Result<AccessKey, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            user_id: UserId<'a>,
        }

        #[derive(Serialize)]
        struct UserId<'a> {
            username: &'a str,
        }

        debug!(username, "creating access key");
        self.inner
            .post(
                "security/security-access-keys",
                &Body {
                    user_id: UserId { username },
                },
            )
            .await
    }
}
