// Input and state documents of the provisioning workflow.
//
// The input file lists desired sites; the state file records what has
// already been created remotely, keyed by normalized site name, so a rerun
// only performs the missing steps.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use bsp_api::{AccessKey, Address, Coordinates, SiteStatus};

use crate::error::CoreError;
use crate::normalize::normalize_name;
use crate::store::read_json;

// ── Input ───────────────────────────────────────────────────────────

/// One desired site as written by the operator.
///
/// Only `siteName` is required; the enterprise-unit and user names default
/// to the site name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInput {
    pub site_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eu_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SiteStatus>,
}

/// `{ "sites": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFile {
    pub sites: Vec<SiteInput>,
}

impl InputFile {
    /// Read and validate an input file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(CoreError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let input: Self = read_json(path)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (index, site) in self.sites.iter().enumerate() {
            if site.site_name.trim().is_empty() {
                return Err(CoreError::InvalidInput {
                    reason: format!("sites[{index}] has an empty siteName"),
                });
            }
        }
        Ok(())
    }
}

/// A [`SiteInput`] with names normalized and defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSite {
    pub site_name: String,
    pub eu_name: String,
    pub user_name: String,
    pub coordinates: Coordinates,
    pub address: Option<Address>,
    pub status: SiteStatus,
}

impl SiteInput {
    pub fn normalize(&self) -> NormalizedSite {
        let site_name = normalize_name(&self.site_name);
        let eu_name = self
            .eu_name
            .as_deref()
            .map_or_else(|| site_name.clone(), normalize_name);
        let user_name = self
            .user_name
            .as_deref()
            .map_or_else(|| site_name.clone(), normalize_name);

        NormalizedSite {
            site_name,
            eu_name,
            user_name,
            coordinates: self.coordinates.unwrap_or_default(),
            address: self.address.clone(),
            status: self.status.unwrap_or_default(),
        }
    }
}

// ── State ───────────────────────────────────────────────────────────

/// What is known to exist remotely for one site.
///
/// `site_id`, `eu_id`, and `user_name_canonical` are absent until the
/// corresponding step has succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    pub eu_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eu_id: Option<String>,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name_canonical: Option<String>,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub status: SiteStatus,
}

impl SiteState {
    /// Fresh record for a site nothing has been created for yet.
    pub fn pending(site: &NormalizedSite) -> Self {
        Self {
            site_id: None,
            eu_name: site.eu_name.clone(),
            eu_id: None,
            user_name: site.user_name.clone(),
            user_name_canonical: None,
            coordinates: site.coordinates,
            address: site.address.clone(),
            status: site.status,
        }
    }
}

/// `{ "sites": { "<normalized site name>": SiteState } }`, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub sites: IndexMap<String, SiteState>,
}

/// Contents of a per-site key file: the site's state plus its issued keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    #[serde(flatten)]
    pub state: SiteState,
    pub shared_key: String,
    pub secret_key: String,
}

impl KeyRecord {
    pub fn new(state: SiteState, key: AccessKey) -> Self {
        Self {
            state,
            shared_key: key.shared_key,
            secret_key: key.secret_key,
        }
    }
}
