// ── Offline verification ──
//
// Compares an input file with a state file without touching the network.
// Each input site is checked on its own; the overall verdicts hold only if
// every site passes.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{InputFile, SiteState, StateFile};
use crate::normalize::normalize_name;
use crate::store::read_json;

/// Outcome for one input site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCheck {
    pub site_name: String,
    /// State key the site was matched to, if any.
    pub matched: Option<String>,
    /// State fields that are still unset.
    pub missing: Vec<&'static str>,
    pub user_matches: bool,
}

impl SiteCheck {
    pub fn site_verified(&self) -> bool {
        self.matched.is_some() && self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub sites_verified: bool,
    pub sites_count: usize,
    pub users_verified: bool,
    pub users_count: usize,
    pub sites: Vec<SiteCheck>,
}

/// Load both files and verify. Either file missing is an error.
pub fn verify_files(input: &Path, state: &Path) -> Result<Verification, CoreError> {
    for path in [input, state] {
        if !path.exists() {
            return Err(CoreError::MissingFile {
                path: path.to_path_buf(),
            });
        }
    }
    let input: InputFile = read_json(input)?;
    let state: StateFile = read_json(state)?;
    Ok(verify(&input, &state))
}

pub fn verify(input: &InputFile, state: &StateFile) -> Verification {
    let sites: Vec<SiteCheck> = input
        .sites
        .iter()
        .map(|site| {
            let normalized = site.normalize();
            let explicit_eu = site.eu_name.as_deref().map(normalize_name);
            check_site(
                &normalized.site_name,
                explicit_eu.as_deref(),
                &normalized.user_name,
                state,
            )
        })
        .collect();

    let sites_count = sites.iter().filter(|c| c.site_verified()).count();
    let users_count = sites.iter().filter(|c| c.user_matches).count();
    let all = |count: usize| !sites.is_empty() && count == sites.len();

    Verification {
        sites_verified: all(sites_count),
        sites_count,
        users_verified: all(users_count),
        users_count,
        sites,
    }
}

/// Match by state key first, then by enterprise unit when the input names
/// one explicitly.
fn find_entry<'a>(
    site_name: &str,
    eu_name: Option<&str>,
    state: &'a StateFile,
) -> Option<(&'a String, &'a SiteState)> {
    state.sites.get_key_value(site_name).or_else(|| {
        let eu_name = eu_name?;
        state
            .sites
            .iter()
            .find(|(_, entry)| normalize_name(&entry.eu_name) == eu_name)
    })
}

fn check_site(
    site_name: &str,
    eu_name: Option<&str>,
    user_name: &str,
    state: &StateFile,
) -> SiteCheck {
    let Some((key, entry)) = find_entry(site_name, eu_name, state) else {
        warn!(site = site_name, "not present in state file");
        return SiteCheck {
            site_name: site_name.to_owned(),
            matched: None,
            missing: Vec::new(),
            user_matches: false,
        };
    };

    let mut missing = Vec::new();
    if entry.user_name.is_empty() {
        missing.push("userName");
    }
    if entry.site_id.as_deref().is_none_or(str::is_empty) {
        missing.push("siteId");
    }
    if entry.eu_id.as_deref().is_none_or(str::is_empty) {
        missing.push("euId");
    }
    if entry.user_name_canonical.as_deref().is_none_or(str::is_empty) {
        missing.push("userNameCanonical");
    }
    for field in &missing {
        warn!(site = %key, eu = %entry.eu_name, "missing {field}");
    }

    SiteCheck {
        site_name: site_name.to_owned(),
        matched: Some(key.clone()),
        missing,
        user_matches: entry.user_name == user_name,
    }
}
