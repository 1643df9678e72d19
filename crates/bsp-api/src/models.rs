// Wire types shared by the BSP service clients.
//
// Field names follow the services' camelCase JSON. List endpoints wrap
// results in a `{ pageContent, lastPage }` page envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Pagination ──────────────────────────────────────────────────────

/// One page of a page-numbered list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub page_content: Vec<T>,
    pub last_page: bool,
}

/// Envelope of a single-shot lookup. Only `pageContent` is read; a
/// `lastPage` flag, if present, is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent<T> {
    #[serde(default = "Vec::new")]
    pub page_content: Vec<T>,
}

// ── Site service ────────────────────────────────────────────────────

/// Lifecycle status of a site.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SiteStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Postal address, forwarded exactly as given: absent parts stay absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Response to a site creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSite {
    pub id: String,
}

// ── Provisioning service ────────────────────────────────────────────

/// Status of a provisioned user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Deleted,
}

/// Response to a user creation. `username` is the canonical form the
/// service stored, which may differ from what was requested.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseUnit {
    pub enterprise_unit_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Security service ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining fields, preserved for export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub username: String,
}

impl GroupMember {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembers {
    pub group_name: String,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

/// A freshly issued access key pair.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    pub shared_key: String,
    pub secret_key: String,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("shared_key", &self.shared_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
