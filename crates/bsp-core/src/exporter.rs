// ── Snapshot export ──
//
// Dumps every site, user, group, group membership, and group role grant the
// credentials can see into JSON files in one directory.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use bsp_api::{Group, GroupMember, ProvisioningClient};

use crate::error::CoreError;
use crate::provisioner::Services;
use crate::store::write_json;

pub const SITES_FILE: &str = "exported-sites.json";
pub const USERS_FILE: &str = "exported-users.json";
pub const GROUPS_FILE: &str = "exported-groups.json";
pub const GROUP_MEMBERS_FILE: &str = "exported-group-members.json";
pub const GROUP_ROLES_FILE: &str = "exported-group-roles.json";

/// Role grants of one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupRoles {
    pub granted: Vec<Value>,
    pub effective: Vec<Value>,
}

/// Result of [`export_group_roles`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleExport {
    pub roles: IndexMap<String, GroupRoles>,
    /// Set when a 403 cut the export short.
    pub skipped: bool,
}

/// Counts of what was written, plus whether role export was cut short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub sites: usize,
    pub users: usize,
    pub groups: usize,
    pub group_roles: usize,
    pub roles_skipped: bool,
    pub files: Vec<PathBuf>,
}

struct Writer<'a> {
    dir: &'a Path,
    files: Vec<PathBuf>,
}

impl Writer<'_> {
    fn write<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), CoreError> {
        let path = self.dir.join(name);
        write_json(&path, value)?;
        info!(path = %path.display(), "exported");
        self.files.push(path);
        Ok(())
    }
}

/// Export everything into `dir`, creating it if needed.
pub async fn export_all(services: &Services, dir: &Path) -> Result<ExportSummary, CoreError> {
    let mut out = Writer {
        dir,
        files: Vec::new(),
    };

    let sites = services.sites.sites().collect_all().await?;
    out.write(SITES_FILE, &sites)?;

    let users = services.provisioning.users("*").collect_all().await?;
    out.write(USERS_FILE, &users)?;

    let groups = services.security.groups("*").collect_all().await?;
    out.write(GROUPS_FILE, &groups)?;

    let mut members: IndexMap<String, Vec<GroupMember>> = IndexMap::with_capacity(groups.len());
    for group in &groups {
        let response = services.security.group_members(&group.group_name).await?;
        members.insert(group.group_name.clone(), response.members);
    }
    out.write(GROUP_MEMBERS_FILE, &members)?;

    let roles = export_group_roles(&services.provisioning, &groups).await?;
    out.write(GROUP_ROLES_FILE, &roles.roles)?;

    Ok(ExportSummary {
        sites: sites.len(),
        users: users.len(),
        groups: groups.len(),
        group_roles: roles.roles.len(),
        roles_skipped: roles.skipped,
        files: out.files,
    })
}

/// Effective and granted roles per group, in group order.
///
/// A 403 means the credentials may not view role grants at all: the groups
/// collected so far are kept and `skipped` is set. Any other
/// failure propagates.
pub async fn export_group_roles(
    provisioning: &ProvisioningClient,
    groups: &[Group],
) -> Result<RoleExport, CoreError> {
    let mut roles = IndexMap::with_capacity(groups.len());
    for group in groups {
        match group_roles(provisioning, &group.group_name).await {
            Ok(entry) => {
                roles.insert(group.group_name.clone(), entry);
            }
            Err(err) if err.is_forbidden() => {
                warn!(
                    group = %group.group_name,
                    "skipping group role export: no permission to view role grants"
                );
                return Ok(RoleExport {
                    roles,
                    skipped: true,
                });
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(RoleExport {
        roles,
        skipped: false,
    })
}

async fn group_roles(
    provisioning: &ProvisioningClient,
    group_name: &str,
) -> Result<GroupRoles, bsp_api::Error> {
    let effective = provisioning.effective_roles(group_name).await?;
    let granted = provisioning.granted_roles(group_name).await?;
    Ok(GroupRoles {
        granted: granted.page_content,
        effective: effective.page_content,
    })
}
