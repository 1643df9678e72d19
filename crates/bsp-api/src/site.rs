// Site service endpoints.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::auth::ServerTarget;
use crate::client::{BspClient, Method};
use crate::error::Error;
use crate::models::{Address, Coordinates, CreatedSite, SiteStatus};
use crate::pagination::Paginator;
use crate::transport::TransportConfig;

/// Optional fields for [`SiteClient::create_site`].
///
/// Defaults: coordinates `{0, 0}`, status `ACTIVE`, no address.
#[derive(Debug, Clone, Default)]
pub struct CreateSiteOptions {
    pub coordinates: Coordinates,
    pub status: SiteStatus,
    pub address: Option<Address>,
}

/// Optional fields for [`SiteClient::update_site`].
///
/// Same defaults as creation. The service replaces what it is sent, so an
/// update always carries all three fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateSiteOptions {
    pub coordinates: Coordinates,
    pub status: SiteStatus,
    pub address: Option<Address>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSiteBody<'a> {
    site_name: &'a str,
    enterprise_unit_name: &'a str,
    locked: bool,
    description: &'a str,
    coordinates: Coordinates,
    status: SiteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a Address>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSiteBody<'a> {
    site_name: &'a str,
    locked: bool,
    coordinates: Coordinates,
    status: SiteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a Address>,
}

/// HTTP client for the site service.
#[derive(Debug, Clone)]
pub struct SiteClient {
    inner: BspClient,
}

impl SiteClient {
    pub fn new(target: ServerTarget, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_client(BspClient::new(target, transport)?))
    }

    pub fn from_client(inner: BspClient) -> Self {
        Self { inner }
    }

    /// Create a site and return its id.
    ///
    /// `POST site/sites`
    pub async fn create_site(
        &self,
        site_name: &str,
        enterprise_unit_name: &str,
        description: &str,
        options: &CreateSiteOptions,
    ) -> Result<CreatedSite, Error> {
        debug!(site_name, "creating site");
        self.inner
            .post(
                "site/sites",
                &CreateSiteBody {
                    site_name,
                    enterprise_unit_name,
                    locked: false,
                    description,
                    coordinates: options.coordinates,
                    status: options.status,
                    address: options.address.as_ref(),
                },
            )
            .await
    }

    /// Update a site's name, coordinates, status, and address.
    ///
    /// `PATCH site/sites/{site_id}`
    pub async fn update_site(
        &self,
        site_id: &str,
        site_name: &str,
        options: &UpdateSiteOptions,
    ) -> Result<Value, Error> {
        debug!(site_id, site_name, "updating site");
        self.inner
            .patch(
                &format!("site/sites/{site_id}"),
                &UpdateSiteBody {
                    site_name,
                    locked: false,
                    coordinates: options.coordinates,
                    status: options.status,
                    address: options.address.as_ref(),
                },
            )
            .await
    }

    /// Every site in the organization.
    ///
    /// `POST site/sites/find-by-criteria?pageNumber=N` with a wildcard name
    /// criterion.
    pub fn sites(&self) -> Paginator<Value> {
        Paginator::new(self.inner.clone(), Method::Post, "site/sites/find-by-criteria")
            .body(json!({ "criteria": { "siteName": "*" } }))
    }
}
