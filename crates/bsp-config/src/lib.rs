//! Shared configuration for the BSP tools.
//!
//! The secret file is JSON keyed by profile name (`default` unless told
//! otherwise). Values may be overridden from the environment with
//! `BSP_<PROFILE>__<FIELD>` (e.g. `BSP_DEFAULT__HOST`), and the two secret
//! keys fall back to the OS keyring when absent from the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use bsp_api::{Credentials, ServerTarget};

pub const DEFAULT_PROFILE: &str = "default";
const KEYRING_SERVICE: &str = "bsp";
const SECRET_FILE_NAME: &str = "secret.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profiles configured (looked in {path})")]
    NoConfig { path: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("no {field} configured for profile '{profile}'")]
    NoCredentials { profile: String, field: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Secret file structs ─────────────────────────────────────────────

/// All profiles from the secret file, keyed by name.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Config {
    pub profiles: BTreeMap<String, Profile>,
}

/// One named BSP environment.
///
/// Field names are camelCase in the file; the snake_case aliases exist for
/// environment overrides, which figment lower-cases.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    /// TLS is on unless this is explicitly `false`.
    #[serde(default, alias = "use_tls")]
    pub use_tls: Option<bool>,

    #[serde(alias = "app_key")]
    pub app_key: String,

    /// HMAC secret (plaintext -- prefer the keyring).
    #[serde(default, alias = "secret_key")]
    pub secret_key: Option<String>,

    /// Shared key sent in `Authorization` (plaintext -- prefer the keyring).
    #[serde(default, alias = "shared_key")]
    pub shared_key: Option<String>,

    pub organization: String,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.available(),
            })
    }

    fn available(&self) -> String {
        if self.profiles.is_empty() {
            return "none".into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

// ── Secret file path ────────────────────────────────────────────────

/// Resolve the secret file: `./secret.json` when present, else the
/// platform config directory.
pub fn default_secret_path() -> PathBuf {
    let local = PathBuf::from(SECRET_FILE_NAME);
    if local.exists() {
        return local;
    }
    ProjectDirs::from("com", "bsp", "bsp-provision")
        .map_or(local, |dirs| dirs.config_dir().join(SECRET_FILE_NAME))
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load all profiles from `path` plus `BSP_<PROFILE>__<FIELD>` overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading secret file");

    let figment = Figment::new().merge(Json::file(path)).merge(
        Env::prefixed("BSP_")
            .filter(|key| key.as_str().contains("__"))
            .split("__"),
    );

    let config: Config = figment.extract()?;
    if config.profiles.is_empty() {
        return Err(ConfigError::NoConfig {
            path: path.display().to_string(),
        });
    }
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve one secret: plaintext in the profile, then the system keyring
/// entry `bsp` / `<profile>/<field>`.
fn resolve_secret(
    value: Option<&String>,
    profile_name: &str,
    field: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(value) = value {
        return Ok(SecretString::from(value.clone()));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{field}")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        field: field.into(),
    })
}

fn require(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

/// Build signing credentials from a profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    require(&profile.app_key, "appKey")?;
    require(&profile.organization, "organization")?;

    Ok(Credentials {
        app_key: profile.app_key.clone(),
        secret_key: resolve_secret(profile.secret_key.as_ref(), profile_name, "secretKey")?,
        shared_key: resolve_secret(profile.shared_key.as_ref(), profile_name, "sharedKey")?,
        organization: profile.organization.clone(),
    })
}

/// Translate a profile into a `ServerTarget`. Callers fold any overrides
/// into the profile first.
pub fn profile_to_target(profile: &Profile, profile_name: &str) -> Result<ServerTarget, ConfigError> {
    require(&profile.host, "host")?;
    let credentials = resolve_credentials(profile, profile_name)?;
    Ok(ServerTarget::new(profile.host.clone(), credentials)
        .with_port(profile.port)
        .with_tls(profile.use_tls.unwrap_or(true)))
}
