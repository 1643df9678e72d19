// ── File-backed stores ──
//
// The state file and the per-site key files. Every write goes to a sibling
// temp file first and is renamed into place, so an interrupted run never
// leaves a truncated document behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{KeyRecord, SiteState, StateFile};

pub const STATE_FILE_NAME: &str = "provisioner-output.json";
pub const KEYS_DIR_NAME: &str = "provisioner-keys";

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let raw = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` to `path`, replacing any existing file atomically.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }

    let mut body = serde_json::to_string_pretty(value).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    body.push('\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, body).map_err(|e| CoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| CoreError::io(path, e))
}

// ── State ───────────────────────────────────────────────────────────

/// The provisioning state document plus where it lives.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: StateFile,
}

impl StateStore {
    /// Load the state file, starting empty when it does not exist yet.
    /// A file that exists but does not parse is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let state = if path.exists() {
            read_json(&path)?
        } else {
            debug!(path = %path.display(), "no state file yet, starting empty");
            StateFile::default()
        };
        Ok(Self { path, state })
    }

    /// State file inside an output directory.
    pub fn in_dir(dir: &Path) -> Result<Self, CoreError> {
        Self::open(dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &StateFile {
        &self.state
    }

    pub fn site(&self, name: &str) -> Option<&SiteState> {
        self.state.sites.get(name)
    }

    /// Record for `name`, inserting `init()` when there is none.
    pub fn site_or_insert_with(
        &mut self,
        name: &str,
        init: impl FnOnce() -> SiteState,
    ) -> &mut SiteState {
        self.state.sites.entry(name.to_owned()).or_insert_with(init)
    }

    pub fn site_mut(&mut self, name: &str) -> Option<&mut SiteState> {
        self.state.sites.get_mut(name)
    }

    pub fn persist(&self) -> Result<(), CoreError> {
        write_json(&self.path, &self.state)
    }
}

// ── Keys ────────────────────────────────────────────────────────────

/// One JSON file per site under `<output>/provisioner-keys/`. Key files are
/// never overwritten: their presence marks the site as fully provisioned.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Key directory inside an output directory.
    pub fn in_dir(output_dir: &Path) -> Self {
        Self::new(output_dir.join(KEYS_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, site_name: &str) -> PathBuf {
        self.dir.join(format!("{site_name}.json"))
    }

    pub fn exists(&self, site_name: &str) -> bool {
        self.path_for(site_name).exists()
    }

    pub fn write(&self, site_name: &str, record: &KeyRecord) -> Result<PathBuf, CoreError> {
        let path = self.path_for(site_name);
        write_json(&path, record)?;
        Ok(path)
    }
}
