// ── Provisioning workflow ──
//
// Walks the input sites in order and brings each one to "fully provisioned":
// site created and reconciled, enterprise unit resolved, controller user
// created, group membership and EU grant in place, access key issued.
// Every step is gated on a field missing from the state record (or on the
// key file being absent), and the state file is rewritten after each remote
// mutation, so a rerun after a failure resumes at the first incomplete step.

use std::path::Path;

use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, error, info};

use bsp_api::{
    BspClient, CreateSiteOptions, EnterpriseUnit, GroupMember, ProvisioningClient, SecurityClient,
    ServerTarget, SiteClient, SiteStatus, TransportConfig, UpdateSiteOptions, UserStatus,
};

use crate::error::CoreError;
use crate::model::{InputFile, KeyRecord, NormalizedSite, SiteInput, SiteState};
use crate::normalize::normalize_name;
use crate::store::{KeyStore, StateStore};

/// Group every site-controller user is added to.
pub const SITE_CONTROLLER_GROUP: &str = "SiteControllerUsers";
const GROUP_DESCRIPTION: &str = "Group to which site controller technical users should be assigned.";
const SITE_DESCRIPTION: &str = "Auto-generated site";

// ── Services ────────────────────────────────────────────────────────

/// The three domain clients the workflow and exporter talk to, all bound to
/// one target.
#[derive(Debug, Clone)]
pub struct Services {
    pub sites: SiteClient,
    pub provisioning: ProvisioningClient,
    pub security: SecurityClient,
}

impl Services {
    pub fn new(target: ServerTarget, transport: &TransportConfig) -> Result<Self, bsp_api::Error> {
        Ok(Self::from_client(BspClient::new(target, transport)?))
    }

    pub fn from_client(client: BspClient) -> Self {
        Self {
            sites: SiteClient::from_client(client.clone()),
            provisioning: ProvisioningClient::from_client(client.clone()),
            security: SecurityClient::from_client(client),
        }
    }
}

// ── Report ──────────────────────────────────────────────────────────

/// What one run did for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReport {
    pub site_name: String,
    pub site_created: bool,
    pub site_updated: bool,
    pub eu_resolved: bool,
    pub user_created: bool,
    pub keys_issued: bool,
}

impl SiteReport {
    fn new(site_name: &str) -> Self {
        Self {
            site_name: site_name.to_owned(),
            ..Self::default()
        }
    }

    /// Whether anything was changed remotely for this site.
    pub fn changed(&self) -> bool {
        self.site_created || self.site_updated || self.eu_resolved || self.user_created || self.keys_issued
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    pub group_created: bool,
    pub sites: Vec<SiteReport>,
}

// ── Provisioner ─────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Provisioner {
    services: Services,
    state: StateStore,
    keys: KeyStore,
}

impl Provisioner {
    pub fn new(services: Services, state: StateStore, keys: KeyStore) -> Self {
        Self {
            services,
            state,
            keys,
        }
    }

    /// Provisioner whose state file and key directory live in `output_dir`.
    pub fn in_dir(services: Services, output_dir: &Path) -> Result<Self, CoreError> {
        Ok(Self::new(
            services,
            StateStore::in_dir(output_dir)?,
            KeyStore::in_dir(output_dir),
        ))
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Provision every input site in order. The first failure ends the run;
    /// whatever was persisted before it is kept.
    pub async fn run(&mut self, input: &InputFile) -> Result<ProvisionReport, CoreError> {
        let group_created = self.ensure_group().await?;

        let mut sites = Vec::with_capacity(input.sites.len());
        for site in &input.sites {
            info!(site = %site.site_name, "processing site");
            match self.provision_site(site).await {
                Ok(report) => sites.push(report),
                Err(err) => {
                    error!(
                        site = %site.site_name,
                        body = err.response_body().unwrap_or_default(),
                        "provisioning failed: {err}"
                    );
                    return Err(err);
                }
            }
        }

        Ok(ProvisionReport {
            group_created,
            sites,
        })
    }

    async fn ensure_group(&self) -> Result<bool, CoreError> {
        let groups = self
            .services
            .security
            .groups(SITE_CONTROLLER_GROUP)
            .into_stream();
        futures_util::pin_mut!(groups);

        if groups.next().await.transpose()?.is_some() {
            debug!(group = SITE_CONTROLLER_GROUP, "group already exists");
            return Ok(false);
        }

        info!(group = SITE_CONTROLLER_GROUP, "creating group");
        let response = self
            .services
            .security
            .create_group(SITE_CONTROLLER_GROUP, GROUP_DESCRIPTION)
            .await?;
        debug!(%response, "group created");
        Ok(true)
    }

    async fn provision_site(&mut self, input: &SiteInput) -> Result<SiteReport, CoreError> {
        let site = input.normalize();
        let mut report = SiteReport::new(&site.site_name);

        let site_id = self.ensure_site(&site, &mut report).await?;
        self.reconcile_site(&site, &site_id, &mut report).await?;
        let eu_id = self.ensure_enterprise_unit(&site, &mut report).await?;
        let username = self.ensure_user(&site, &mut report).await?;
        self.ensure_access(&site, &eu_id, &username, &mut report)
            .await?;

        Ok(report)
    }

    /// State record for `site`, created from the input on first sight.
    fn record(&mut self, site: &NormalizedSite) -> &mut SiteState {
        self.state
            .site_or_insert_with(&site.site_name, || SiteState::pending(site))
    }

    async fn ensure_site(
        &mut self,
        site: &NormalizedSite,
        report: &mut SiteReport,
    ) -> Result<String, CoreError> {
        if let Some(id) = self.record(site).site_id.clone() {
            return Ok(id);
        }

        info!(site = %site.site_name, "creating site");
        let options = CreateSiteOptions {
            coordinates: site.coordinates,
            status: site.status,
            address: site.address.clone(),
        };
        let created = self
            .services
            .sites
            .create_site(&site.site_name, &site.eu_name, SITE_DESCRIPTION, &options)
            .await?;

        // The service reports new sites as active whatever was requested;
        // reconciliation pushes the requested status afterwards.
        let record = self.record(site);
        record.site_id = Some(created.id.clone());
        record.status = SiteStatus::Active;
        self.state.persist()?;

        report.site_created = true;
        Ok(created.id)
    }

    async fn reconcile_site(
        &mut self,
        site: &NormalizedSite,
        site_id: &str,
        report: &mut SiteReport,
    ) -> Result<(), CoreError> {
        let record = self.record(site);
        let status = record.status != site.status;
        let coordinates = record.coordinates != site.coordinates;
        let address = record.address != site.address;
        if !(status || coordinates || address) {
            return Ok(());
        }

        info!(site = %site.site_name, status, coordinates, address, "updating site");
        let options = UpdateSiteOptions {
            coordinates: site.coordinates,
            status: site.status,
            address: site.address.clone(),
        };
        self.services
            .sites
            .update_site(site_id, &site.site_name, &options)
            .await?;

        let record = self.record(site);
        record.status = site.status;
        record.coordinates = site.coordinates;
        record.address.clone_from(&site.address);
        self.state.persist()?;

        report.site_updated = true;
        Ok(())
    }

    async fn ensure_enterprise_unit(
        &mut self,
        site: &NormalizedSite,
        report: &mut SiteReport,
    ) -> Result<String, CoreError> {
        if let Some(id) = self.record(site).eu_id.clone() {
            return Ok(id);
        }

        info!(site = %site.site_name, eu = %site.eu_name, "resolving enterprise unit");
        let page = self
            .services
            .provisioning
            .enterprise_units(&site.eu_name)
            .await?;
        let eu_id = single_enterprise_unit(&site.eu_name, page.page_content)?;

        self.record(site).eu_id = Some(eu_id.clone());
        self.state.persist()?;

        report.eu_resolved = true;
        Ok(eu_id)
    }

    async fn ensure_user(
        &mut self,
        site: &NormalizedSite,
        report: &mut SiteReport,
    ) -> Result<String, CoreError> {
        if let Some(username) = self.record(site).user_name_canonical.clone() {
            return Ok(username);
        }

        let requested = normalize_name(&site.user_name);
        info!(site = %site.site_name, user = %requested, "creating user");
        let created = self
            .services
            .provisioning
            .create_user(&requested, UserStatus::Active)
            .await?;

        self.record(site).user_name_canonical = Some(created.username.clone());
        self.state.persist()?;

        report.user_created = true;
        Ok(created.username)
    }

    async fn ensure_access(
        &mut self,
        site: &NormalizedSite,
        eu_id: &str,
        username: &str,
        report: &mut SiteReport,
    ) -> Result<(), CoreError> {
        if self.keys.exists(&site.site_name) {
            debug!(site = %site.site_name, "key file present, access already provisioned");
            return Ok(());
        }

        info!(site = %site.site_name, user = %username, "setting permissions");
        self.services
            .security
            .add_users_to_group(SITE_CONTROLLER_GROUP, &[GroupMember::new(username)])
            .await?;
        self.services
            .provisioning
            .grant_enterprise_unit_to_user(eu_id, username)
            .await?;

        info!(site = %site.site_name, "creating keys");
        let key = self
            .services
            .security
            .create_security_access_key(username)
            .await?;
        let record = KeyRecord::new(self.record(site).clone(), key);
        let path = self.keys.write(&site.site_name, &record)?;
        debug!(path = %path.display(), "key file written");

        report.keys_issued = true;
        Ok(())
    }
}

/// The one unit a name lookup must return.
fn single_enterprise_unit(name: &str, units: Vec<EnterpriseUnit>) -> Result<String, CoreError> {
    let count = units.len();
    match (units.into_iter().next(), count) {
        (Some(unit), 1) => Ok(unit.enterprise_unit_id),
        (None, _) => Err(CoreError::EnterpriseUnitNotFound { name: name.into() }),
        _ => Err(CoreError::AmbiguousEnterpriseUnit {
            name: name.into(),
            count,
        }),
    }
}
